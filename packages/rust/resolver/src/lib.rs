//! Repository resolver: site descriptor → deduplicated local checkouts.
//!
//! Turns the upstream site descriptor's `content.sources[]` list into a
//! collision-safe set of local repository checkouts, cloning or refreshing
//! each through the [`CommandRunner`](docforge_shared::CommandRunner)
//! capability.

pub mod checkout;
pub mod descriptor;

pub use checkout::{ResolveReport, resolve};
pub use descriptor::parse_descriptor;

use std::path::Path;

use docforge_shared::{DocforgeError, Result, SourceDescriptor};

/// Read and parse a site descriptor file from disk.
pub fn read_descriptor(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let yaml = std::fs::read_to_string(path).map_err(|e| DocforgeError::io(path, e))?;
    parse_descriptor(&yaml)
}
