//! Shared types, error model, and configuration for docforge.
//!
//! This crate is the foundation depended on by all other docforge crates.
//! It provides:
//! - [`DocforgeError`] — the unified error type
//! - Domain types ([`SourceDescriptor`], [`Checkout`], [`Component`], [`PageMeta`])
//! - Configuration ([`AppConfig`], config loading)
//! - The [`CommandRunner`] capability for external commands

pub mod command;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use command::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use config::{
    AppConfig, BuildDirsConfig, IngestConfig, SiteConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{DocforgeError, Result};
pub use types::{Checkout, Component, ComponentManifest, PageMeta, SourceDescriptor};
