//! Application configuration for docforge.
//!
//! User config lives at `~/.docforge/docforge.toml`.
//! CLI flags override config file values, which override defaults.
//! Defaults reproduce the Fedora documentation site constants.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocforgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docforge";

// ---------------------------------------------------------------------------
// Config structs (matching docforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site metadata rendered into the playbook and the extracted records.
    #[serde(default)]
    pub site: SiteConfig,

    /// Build directories and the container image used for the site build.
    #[serde(default)]
    pub build: BuildDirsConfig,

    /// Downstream ingestion command settings.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// `[site]` section — fixed fields of the synthesized playbook plus the
/// provenance constants stamped on every extracted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title rendered into the playbook.
    #[serde(default = "default_site_title")]
    pub title: String,

    /// Start page reference for the aggregated site.
    #[serde(default = "default_start_page")]
    pub start_page: String,

    /// UI bundle archive URL for the playbook's `ui.bundle`.
    #[serde(default = "default_ui_bundle_url")]
    pub ui_bundle_url: String,

    /// Public base URL used to reconstruct per-page source URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// License identifier stamped on every extracted page.
    #[serde(default = "default_license")]
    pub license: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            start_page: default_start_page(),
            ui_bundle_url: default_ui_bundle_url(),
            base_url: default_base_url(),
            license: default_license(),
        }
    }
}

fn default_site_title() -> String {
    "Fedora Documentation".into()
}
fn default_start_page() -> String {
    "quick-docs::index.adoc".into()
}
fn default_ui_bundle_url() -> String {
    "https://gitlab.com/fedora/docs/docs-website/ui-bundle/-/jobs/artifacts/HEAD/raw/build/ui-bundle.zip?job=bundle-stable".into()
}
fn default_base_url() -> String {
    "https://docs.fedoraproject.org".into()
}
fn default_license() -> String {
    "CC-BY-SA 4.0".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDirsConfig {
    /// Work directory for checkouts, the playbook, and the generated site.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Destination directory for extracted content + sidecars.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Output directory for the final database dump.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Container image running the static-site generator.
    #[serde(default = "default_antora_image")]
    pub antora_image: String,
}

impl Default for BuildDirsConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            antora_image: default_antora_image(),
        }
    }
}

fn default_work_dir() -> String {
    "build".into()
}
fn default_content_dir() -> String {
    "docs2db_content".into()
}
fn default_output_dir() -> String {
    "dist".into()
}
fn default_antora_image() -> String {
    "docker.io/antora/antora".into()
}

/// `[ingest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Command prefix for the downstream ingestion CLI
    /// (each operation appends its own subcommand and flags).
    #[serde(default = "default_ingest_command")]
    pub command: Vec<String>,

    /// Title passed to the load operation.
    #[serde(default = "default_dataset_title")]
    pub dataset_title: String,

    /// Description passed to the load operation.
    #[serde(default = "default_dataset_description")]
    pub dataset_description: String,

    /// File name of the database dump within the output directory.
    #[serde(default = "default_dump_file")]
    pub dump_file: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            command: default_ingest_command(),
            dataset_title: default_dataset_title(),
            dataset_description: default_dataset_description(),
            dump_file: default_dump_file(),
        }
    }
}

fn default_ingest_command() -> Vec<String> {
    vec!["uv".into(), "run".into(), "docs2db".into()]
}
fn default_dataset_title() -> String {
    "Fedora Documentation".into()
}
fn default_dataset_description() -> String {
    "RAG database of Fedora Project documentation".into()
}
fn default_dump_file() -> String {
    "fedora-docs.sql".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocforgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docforge/docforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocforgeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocforgeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocforgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocforgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocforgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("work_dir"));
        assert!(toml_str.contains("antora/antora"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.site.license, "CC-BY-SA 4.0");
        assert_eq!(parsed.build.work_dir, "build");
        assert_eq!(parsed.ingest.command, vec!["uv", "run", "docs2db"]);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[site]
title = "Internal Handbook"

[build]
work_dir = "/tmp/handbook-build"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.title, "Internal Handbook");
        assert_eq!(config.site.start_page, "quick-docs::index.adoc");
        assert_eq!(config.build.work_dir, "/tmp/handbook-build");
        assert_eq!(config.build.content_dir, "docs2db_content");
    }
}
