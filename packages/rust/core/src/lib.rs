//! Pipeline orchestration for docforge.
//!
//! Ties the resolver, playbook synthesis, external site build, content
//! extraction, and the downstream ingestion contract into one strictly
//! sequential run with numbered progress stages.

pub mod antora;
pub mod ingest;
pub mod pipeline;

pub use ingest::Ingestor;
pub use pipeline::{BuildConfig, BuildResult, ProgressReporter, SilentProgress, run_build};
