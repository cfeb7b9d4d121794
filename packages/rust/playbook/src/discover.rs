//! Component discovery and name-based deduplication.
//!
//! A checkout contributes a root component when `antora.yml` sits at its top
//! level, and one nested component per immediate child directory carrying a
//! manifest. Names are claimed first-wins across the whole run: a later
//! component declaring an already-claimed name is skipped, whichever
//! component was discovered first keeps the name.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use docforge_shared::{Checkout, Component, ComponentManifest, DocforgeError, Result};

/// Manifest file name probed at the checkout root and in immediate subdirectories.
pub const MANIFEST_FILE: &str = "antora.yml";

/// A component discarded because its declared name was already claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDuplicate {
    /// Location of the discarded component (`checkout` or `checkout/subdir`).
    pub location: String,
    /// The name it collided on.
    pub name: String,
}

/// Outcome of one discovery pass over the checkout list.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Accepted components, in deterministic order: checkout order, root
    /// before subdirectories, subdirectories sorted by name.
    pub accepted: Vec<Component>,
    /// Components skipped as duplicates of an earlier name claim.
    pub duplicates: Vec<SkippedDuplicate>,
    /// Checkouts contributing no manifest at all (diagnostic, not an error).
    pub no_manifest: Vec<String>,
}

/// Discover every component across the ordered checkout list and apply the
/// first-wins name dedup.
///
/// Name identity, not structural identity, drives dedup: unnamed components
/// are never treated as duplicates of each other.
#[instrument(skip_all, fields(checkouts = checkouts.len()))]
pub fn discover_components(checkouts: &[Checkout]) -> Result<DiscoveryReport> {
    let mut registry: HashSet<String> = HashSet::new();
    let mut report = DiscoveryReport::default();

    for checkout in checkouts {
        let mut found_any = false;

        for component in components_in(checkout)? {
            found_any = true;
            match component.name() {
                Some(name) if registry.contains(name) => {
                    debug!(location = %component.location(), name, "skipping duplicate component");
                    report.duplicates.push(SkippedDuplicate {
                        location: component.location(),
                        name: name.to_string(),
                    });
                }
                Some(name) => {
                    registry.insert(name.to_string());
                    report.accepted.push(component);
                }
                None => report.accepted.push(component),
            }
        }

        if !found_any {
            debug!(checkout = %checkout.name, "no manifest found");
            report.no_manifest.push(checkout.name.clone());
        }
    }

    info!(
        accepted = report.accepted.len(),
        duplicates = report.duplicates.len(),
        no_manifest = report.no_manifest.len(),
        "component discovery complete"
    );

    Ok(report)
}

/// Enumerate the components one checkout contributes: root first, then
/// immediate subdirectories in sorted name order.
fn components_in(checkout: &Checkout) -> Result<Vec<Component>> {
    let mut components = Vec::new();

    let root_manifest = checkout.local_path.join(MANIFEST_FILE);
    if root_manifest.exists() {
        components.push(Component::Root {
            checkout: checkout.name.clone(),
            name: read_manifest_name(&root_manifest),
        });
    }

    let mut subdirs: Vec<String> = std::fs::read_dir(&checkout.local_path)
        .map_err(|e| DocforgeError::io(&checkout.local_path, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| entry.path().join(MANIFEST_FILE).exists())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    subdirs.sort();

    for subdir in subdirs {
        let manifest = checkout.local_path.join(&subdir).join(MANIFEST_FILE);
        components.push(Component::Nested {
            checkout: checkout.name.clone(),
            start_path: subdir,
            name: read_manifest_name(&manifest),
        });
    }

    Ok(components)
}

/// Read the declared name from a manifest file. An unreadable or malformed
/// manifest yields an unnamed component rather than aborting discovery; the
/// external build tool will surface genuinely broken manifests itself.
fn read_manifest_name(path: &Path) -> Option<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read manifest, treating as unnamed");
            return None;
        }
    };

    match serde_yaml::from_str::<ComponentManifest>(&content) {
        Ok(manifest) => manifest.name.filter(|n| !n.is_empty()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed manifest, treating as unnamed");
            None
        }
    }
}
