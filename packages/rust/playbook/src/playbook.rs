//! Build playbook synthesis.
//!
//! Renders the accepted component list into the static-site generator's
//! build descriptor (`site.yml`). The source list is in exact bijection with
//! the accepted list; site metadata, the UI bundle reference, and the output
//! location are fixed fields of the system, not derived from input.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use docforge_shared::{Component, DocforgeError, Result, SiteConfig};

/// Branch selector emitted for every playbook source: build whatever the
/// shallow clone checked out.
const BRANCH_SELECTOR: &str = "HEAD";

/// Site output directory within the work directory.
pub const SITE_OUTPUT_DIR: &str = "./public";

/// File name of the synthesized playbook within the work directory.
pub const PLAYBOOK_FILE: &str = "site.yml";

// ---------------------------------------------------------------------------
// Playbook document
// ---------------------------------------------------------------------------

/// The generated build descriptor, serialized to YAML.
#[derive(Debug, Clone, Serialize)]
pub struct Playbook {
    pub site: SiteSection,
    pub content: ContentSection,
    pub ui: UiSection,
    pub output: OutputSection,
    pub runtime: RuntimeSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteSection {
    pub title: String,
    pub start_page: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentSection {
    pub sources: Vec<PlaybookSource>,
}

/// One entry in the playbook's `content.sources[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybookSource {
    /// Checkout-relative url (`./<checkout-dir>`).
    pub url: String,
    /// Subdirectory start path for nested components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_path: Option<String>,
    /// Fixed branch selector.
    pub branches: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiSection {
    pub bundle: UiBundle,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiBundle {
    pub url: String,
    pub snapshot: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSection {
    pub clean: bool,
    pub dir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeSection {
    pub fetch: bool,
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

impl Playbook {
    /// Build a playbook referencing exactly the accepted components.
    ///
    /// Fails when the accepted list is empty — a playbook with no sources
    /// cannot be built downstream.
    pub fn synthesize(site: &SiteConfig, accepted: &[Component]) -> Result<Self> {
        if accepted.is_empty() {
            return Err(DocforgeError::validation(
                "no Antora sources found: nothing to build",
            ));
        }

        let sources = accepted.iter().map(playbook_source).collect();

        Ok(Self {
            site: SiteSection {
                title: site.title.clone(),
                start_page: site.start_page.clone(),
            },
            content: ContentSection { sources },
            ui: UiSection {
                bundle: UiBundle {
                    url: site.ui_bundle_url.clone(),
                    snapshot: true,
                },
            },
            output: OutputSection {
                clean: true,
                dir: SITE_OUTPUT_DIR.to_string(),
            },
            runtime: RuntimeSection { fetch: true },
        })
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| DocforgeError::parse(format!("playbook serialization failed: {e}")))
    }

    /// Write the playbook as `site.yml` into the work directory.
    /// Returns the path written.
    #[instrument(skip_all, fields(work_dir = %work_dir.display(), sources = self.content.sources.len()))]
    pub fn write(&self, work_dir: &Path) -> Result<PathBuf> {
        let path = work_dir.join(PLAYBOOK_FILE);
        let yaml = self.to_yaml()?;
        std::fs::write(&path, yaml).map_err(|e| DocforgeError::io(&path, e))?;

        info!(path = %path.display(), sources = self.content.sources.len(), "wrote playbook");
        Ok(path)
    }
}

fn playbook_source(component: &Component) -> PlaybookSource {
    match component {
        Component::Root { checkout, .. } => PlaybookSource {
            url: format!("./{checkout}"),
            start_path: None,
            branches: BRANCH_SELECTOR.to_string(),
        },
        Component::Nested {
            checkout,
            start_path,
            ..
        } => PlaybookSource {
            url: format!("./{checkout}"),
            start_path: Some(start_path.clone()),
            branches: BRANCH_SELECTOR.to_string(),
        },
    }
}
