//! Clone-or-update resolution of documentation repositories.
//!
//! Each source becomes at most one [`Checkout`] under the work directory.
//! An existing checkout gets a non-destructive `git pull`; refresh failure
//! keeps the stale copy. A missing checkout gets a shallow, single-branch
//! clone; clone failure omits the repository and is surfaced in the report.

use std::path::Path;

use tracing::{info, instrument, warn};

use docforge_shared::{Checkout, CommandRunner, DocforgeError, Result, SourceDescriptor};

/// Outcome of resolving all sources into local checkouts.
#[derive(Debug, Default)]
pub struct ResolveReport {
    /// Successfully resolved checkouts, in input source order.
    pub checkouts: Vec<Checkout>,
    /// Freshly cloned checkout names.
    pub cloned: Vec<String>,
    /// Refreshed checkout names.
    pub refreshed: Vec<String>,
    /// Names kept stale after a failed refresh.
    pub stale: Vec<String>,
    /// Names that failed to clone and were omitted.
    pub failed: Vec<String>,
}

/// Resolve every source into a local checkout under `work_dir`.
///
/// Re-running against an already-cloned set refreshes in place and never
/// duplicates checkouts. Returns an error only when not a single repository
/// could be resolved — nothing to build.
#[instrument(skip_all, fields(sources = sources.len(), work_dir = %work_dir.display()))]
pub fn resolve(
    sources: &[SourceDescriptor],
    work_dir: &Path,
    runner: &dyn CommandRunner,
) -> Result<ResolveReport> {
    std::fs::create_dir_all(work_dir).map_err(|e| DocforgeError::io(work_dir, e))?;

    let mut report = ResolveReport::default();

    for source in sources {
        let name = source.local_name();
        let repo_dir = work_dir.join(&name);

        if repo_dir.exists() {
            match runner.run("git", &["pull"], Some(&repo_dir)) {
                Ok(out) if out.success => {
                    info!(name, "refreshed checkout");
                    report.refreshed.push(name.clone());
                }
                Ok(out) => {
                    warn!(name, stderr = %out.stderr.trim(), "refresh failed, using existing checkout");
                    report.stale.push(name.clone());
                }
                Err(e) => {
                    warn!(name, error = %e, "refresh failed, using existing checkout");
                    report.stale.push(name.clone());
                }
            }
            report.checkouts.push(Checkout {
                name,
                local_path: repo_dir,
                origin_url: source.url.clone(),
            });
            continue;
        }

        let repo_dir_str = repo_dir.to_string_lossy().to_string();
        let mut args = vec!["clone", "--depth", "1", "--single-branch"];
        if let Some(branch) = &source.branch {
            args.push("--branch");
            args.push(branch);
        }
        args.push(&source.url);
        args.push(&repo_dir_str);

        match runner.run("git", &args, None) {
            Ok(out) if out.success => {
                info!(name, url = %source.url, "cloned checkout");
                report.cloned.push(name.clone());
                report.checkouts.push(Checkout {
                    name,
                    local_path: repo_dir,
                    origin_url: source.url.clone(),
                });
            }
            Ok(out) => {
                warn!(name, url = %source.url, stderr = %out.stderr.trim(), "clone failed, omitting");
                report.failed.push(name);
            }
            Err(e) => {
                warn!(name, url = %source.url, error = %e, "clone failed, omitting");
                report.failed.push(name);
            }
        }
    }

    if report.checkouts.is_empty() {
        return Err(DocforgeError::validation(
            "no repositories could be cloned or refreshed",
        ));
    }

    info!(
        resolved = report.checkouts.len(),
        cloned = report.cloned.len(),
        refreshed = report.refreshed.len(),
        stale = report.stale.len(),
        failed = report.failed.len(),
        "repository resolution complete"
    );

    Ok(report)
}
