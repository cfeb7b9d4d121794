//! Core domain types for the docforge aggregation pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceDescriptor
// ---------------------------------------------------------------------------

/// A declared external documentation source, parsed from the upstream
/// site descriptor. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Repository location (normalized to end in `.git`).
    pub url: String,
    /// Branch to clone, when the descriptor pins one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SourceDescriptor {
    /// Derive a collision-resistant local directory name from the last two
    /// URL path segments, so `org/repo` and `other/repo` never collide on
    /// the bare repository name.
    pub fn local_name(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        let stripped = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let mut segments: Vec<&str> = stripped
            .rsplit('/')
            .take(2)
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .collect();
        segments.reverse();
        segments.join("__")
    }
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// A local working copy of a [`SourceDescriptor`].
///
/// Created or refreshed at pipeline start; the containing work directory is
/// removed on success and preserved on failure for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Collision-resistant directory name within the work directory.
    pub name: String,
    /// Absolute or work-relative path of the checkout.
    pub local_path: PathBuf,
    /// The remote URL this checkout was cloned from.
    pub origin_url: String,
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// The component manifest (`antora.yml`) found inside a checkout.
/// Only the declared name matters to the pipeline; all other keys are
/// the build tool's business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentManifest {
    /// Declared component name. Optional — unnamed components are accepted
    /// without dedup.
    #[serde(default)]
    pub name: Option<String>,
}

/// A documentation component discovered inside a checkout.
///
/// A checkout contributes a `Root` component when a manifest sits at its top
/// level, and one `Nested` component per immediate child directory carrying
/// a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    /// Manifest at the checkout root.
    Root {
        /// Checkout directory name (playbook source url is `./<name>`).
        checkout: String,
        /// Declared component name, if any.
        name: Option<String>,
    },
    /// Manifest in an immediate subdirectory of the checkout.
    Nested {
        /// Checkout directory name.
        checkout: String,
        /// Subdirectory name, emitted as the playbook `start_path`.
        start_path: String,
        /// Declared component name, if any.
        name: Option<String>,
    },
}

impl Component {
    /// The declared manifest name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Root { name, .. } | Self::Nested { name, .. } => name.as_deref(),
        }
    }

    /// The checkout directory this component lives in.
    pub fn checkout(&self) -> &str {
        match self {
            Self::Root { checkout, .. } | Self::Nested { checkout, .. } => checkout,
        }
    }

    /// Human-readable location for diagnostics (`checkout` or `checkout/subdir`).
    pub fn location(&self) -> String {
        match self {
            Self::Root { checkout, .. } => checkout.clone(),
            Self::Nested {
                checkout,
                start_path,
                ..
            } => format!("{checkout}/{start_path}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PageMeta
// ---------------------------------------------------------------------------

/// Provenance metadata written as the `.meta.json` sidecar next to each
/// extracted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Resolved page title.
    pub title: String,
    /// Reconstructed canonical public URL for the page.
    pub source_url: String,
    /// License identifier applied to all extracted content.
    pub license: String,
}

impl PageMeta {
    /// Reconstruct the canonical public URL from a base URL and the page's
    /// path relative to the generated output tree.
    pub fn source_url_for(base_url: &str, rel_path: &Path) -> String {
        let rel = rel_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", base_url.trim_end_matches('/'), rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_uses_last_two_segments() {
        let src = SourceDescriptor {
            url: "https://pagure.io/fedora-docs/quick-docs.git".into(),
            branch: None,
        };
        assert_eq!(src.local_name(), "fedora-docs__quick-docs");
    }

    #[test]
    fn local_name_disambiguates_same_repo_name() {
        let a = SourceDescriptor {
            url: "https://pagure.io/fedora-ci/docs.git".into(),
            branch: None,
        };
        let b = SourceDescriptor {
            url: "https://pagure.io/atomic-desktops/docs.git".into(),
            branch: None,
        };
        assert_ne!(a.local_name(), b.local_name());
        assert_eq!(a.local_name(), "fedora-ci__docs");
    }

    #[test]
    fn local_name_single_segment_url() {
        let src = SourceDescriptor {
            url: "https://example.org/solo.git".into(),
            branch: None,
        };
        assert_eq!(src.local_name(), "example.org__solo");
    }

    #[test]
    fn component_location_formats() {
        let root = Component::Root {
            checkout: "fedora-docs__quick-docs".into(),
            name: Some("quick-docs".into()),
        };
        assert_eq!(root.location(), "fedora-docs__quick-docs");

        let nested = Component::Nested {
            checkout: "containers__podman.io".into(),
            start_path: "docs".into(),
            name: None,
        };
        assert_eq!(nested.location(), "containers__podman.io/docs");
        assert_eq!(nested.name(), None);
    }

    #[test]
    fn manifest_parses_with_and_without_name() {
        let named: ComponentManifest =
            serde_yaml::from_str("name: quick-docs\nversion: master\n").expect("parse");
        assert_eq!(named.name.as_deref(), Some("quick-docs"));

        let unnamed: ComponentManifest = serde_yaml::from_str("version: master\n").expect("parse");
        assert!(unnamed.name.is_none());
    }

    #[test]
    fn page_meta_sidecar_roundtrip() {
        let meta = PageMeta {
            title: "Installing Fedora".into(),
            source_url: "https://docs.fedoraproject.org/quick-docs/install.html".into(),
            license: "CC-BY-SA 4.0".into(),
        };
        let json = serde_json::to_string_pretty(&meta).expect("serialize");
        let parsed: PageMeta = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, meta);
    }

    #[test]
    fn source_url_joins_without_double_slash() {
        let url = PageMeta::source_url_for(
            "https://docs.fedoraproject.org/",
            Path::new("quick-docs/install.html"),
        );
        assert_eq!(url, "https://docs.fedoraproject.org/quick-docs/install.html");
    }
}
