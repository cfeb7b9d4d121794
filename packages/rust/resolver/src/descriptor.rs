//! Upstream site descriptor parser.
//!
//! The descriptor is a YAML document with a `content.sources[]` list, each
//! entry carrying at least a `url`. Entries without a recognized scheme are
//! ignored; URLs without the `.git` suffix are normalized by appending it.

use serde::Deserialize;
use url::Url;

use docforge_shared::{DocforgeError, Result, SourceDescriptor};

// ---------------------------------------------------------------------------
// Raw YAML shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    content: RawContent,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    sources: Vec<RawSource>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    url: String,
    #[serde(default)]
    branches: Option<Branches>,
}

/// `branches:` may be a single scalar or a list; only the first value is
/// honored as the clone branch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Branches {
    One(String),
    Many(Vec<String>),
}

impl Branches {
    fn first(&self) -> Option<&str> {
        match self {
            Self::One(b) => Some(b.as_str()),
            Self::Many(list) => list.first().map(String::as_str),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a site descriptor into an ordered, deduplicated source list.
///
/// Deduplication is by exact normalized URL, first occurrence wins, input
/// order preserved.
pub fn parse_descriptor(yaml: &str) -> Result<Vec<SourceDescriptor>> {
    let raw: RawDescriptor = serde_yaml::from_str(yaml)
        .map_err(|e| DocforgeError::parse(format!("invalid site descriptor: {e}")))?;

    let mut seen = std::collections::HashSet::new();
    let mut sources = Vec::new();

    for entry in raw.content.sources {
        let Some(url) = normalize_url(&entry.url) else {
            tracing::debug!(url = %entry.url, "ignoring source without a recognized scheme");
            continue;
        };

        if !seen.insert(url.clone()) {
            tracing::debug!(%url, "ignoring duplicate source URL");
            continue;
        }

        let branch = entry
            .branches
            .as_ref()
            .and_then(Branches::first)
            .map(str::to_string);

        sources.push(SourceDescriptor { url, branch });
    }

    Ok(sources)
}

/// Normalize a source URL: require an `http(s)` scheme, append `.git` when
/// missing. Returns `None` for unparseable URLs and unrecognized schemes
/// (scp-style `git@host:` remotes are not cloneable anonymously).
fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    if trimmed.ends_with(".git") {
        Some(trimmed.to_string())
    } else {
        Some(format!("{trimmed}.git"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"
site:
  title: Fedora Documentation
content:
  sources:
    - url: https://pagure.io/fedora-docs/quick-docs.git
    - url: https://github.com/coreos/fedora-coreos-docs
      branches: main
    - url: https://pagure.io/fedora-docs/quick-docs.git
    - url: git@pagure.io:fedora-docs/flatpak.git
    - url: https://pagure.io/epel/epel-docs.git
      branches: [stable, rawhide]
"#;

    #[test]
    fn parses_and_dedups_in_first_seen_order() {
        let sources = parse_descriptor(DESCRIPTOR).expect("parse");
        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://pagure.io/fedora-docs/quick-docs.git",
                "https://github.com/coreos/fedora-coreos-docs.git",
                "https://pagure.io/epel/epel-docs.git",
            ]
        );
    }

    #[test]
    fn appends_git_suffix_when_missing() {
        let sources = parse_descriptor(DESCRIPTOR).expect("parse");
        assert_eq!(sources[1].url, "https://github.com/coreos/fedora-coreos-docs.git");
    }

    #[test]
    fn ignores_unrecognized_schemes() {
        let sources = parse_descriptor(DESCRIPTOR).expect("parse");
        assert!(!sources.iter().any(|s| s.url.contains("git@")));
    }

    #[test]
    fn picks_first_branch_scalar_or_list() {
        let sources = parse_descriptor(DESCRIPTOR).expect("parse");
        assert_eq!(sources[1].branch.as_deref(), Some("main"));
        assert_eq!(sources[2].branch.as_deref(), Some("stable"));
        assert_eq!(sources[0].branch, None);
    }

    #[test]
    fn empty_sources_is_not_a_parse_error() {
        let sources = parse_descriptor("content:\n  sources: []\n").expect("parse");
        assert!(sources.is_empty());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_descriptor("content: [not a mapping").unwrap_err();
        assert!(err.to_string().contains("invalid site descriptor"));
    }
}
