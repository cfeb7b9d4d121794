//! Content extraction from the generated site tree.
//!
//! Walks the static-site build output, isolates the primary article region
//! of each page, strips navigation chrome, and writes one normalized
//! (content, metadata) file pair per page. Extraction is best-effort across
//! the whole tree and idempotent per invocation.

mod page;

pub use page::{ExtractedPage, extract_page, flatten_rel_path};

use std::path::Path;

use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use docforge_shared::{DocforgeError, PageMeta, Result, SiteConfig};

/// Site-infrastructure pages that are never inspected.
const EXCLUDED_PAGES: [&str; 3] = ["404.html", "sitemap.html", "search.html"];

/// Outcome of one extraction pass over the generated tree.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Number of content records written.
    pub extracted: usize,
    /// Relative paths of pages with no content region (diagnostic).
    pub skipped_no_content: Vec<String>,
    /// Relative paths of pages that failed to read or write (diagnostic).
    pub failed: Vec<String>,
}

/// Extract one content record per qualifying page under `site_root` into
/// `dest`.
///
/// Prior output of the same kind in `dest` is cleared first, so re-running
/// against an unchanged tree reproduces the same set of files. Fails only
/// when the build output is missing or not a single page qualifies.
#[instrument(skip_all, fields(site_root = %site_root.display(), dest = %dest.display()))]
pub fn extract_tree(site_root: &Path, dest: &Path, site: &SiteConfig) -> Result<ExtractReport> {
    if !site_root.is_dir() {
        return Err(DocforgeError::validation(format!(
            "build output not found at {}",
            site_root.display()
        )));
    }

    std::fs::create_dir_all(dest).map_err(|e| DocforgeError::io(dest, e))?;
    clear_previous_output(dest)?;

    let mut report = ExtractReport::default();

    for entry in WalkDir::new(site_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "html") {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if EXCLUDED_PAGES.contains(&file_name.as_ref()) {
            continue;
        }

        let rel_path = path.strip_prefix(site_root).unwrap_or(path);
        let rel_display = rel_path.to_string_lossy().into_owned();

        match extract_one(path, rel_path, dest, site) {
            Ok(true) => report.extracted += 1,
            Ok(false) => report.skipped_no_content.push(rel_display),
            Err(e) => {
                warn!(page = %rel_display, error = %e, "could not process page");
                report.failed.push(rel_display);
            }
        }
    }

    if report.extracted == 0 {
        return Err(DocforgeError::validation("no content extracted"));
    }

    info!(
        extracted = report.extracted,
        skipped_no_content = report.skipped_no_content.len(),
        failed = report.failed.len(),
        "extraction complete"
    );

    Ok(report)
}

/// Process a single page. `Ok(false)` means no content region was found.
fn extract_one(path: &Path, rel_path: &Path, dest: &Path, site: &SiteConfig) -> Result<bool> {
    let html = std::fs::read_to_string(path).map_err(|e| DocforgeError::io(path, e))?;

    let Some(page) = extract_page(&html) else {
        return Ok(false);
    };

    let title = page.title.unwrap_or_else(|| {
        rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let out_name = flatten_rel_path(rel_path);
    let out_path = dest.join(&out_name);

    let content = format!(
        "<html><head><title>{title}</title></head><body>{body}</body></html>",
        body = page.body_html
    );
    std::fs::write(&out_path, content).map_err(|e| DocforgeError::io(&out_path, e))?;

    let meta = PageMeta {
        title,
        source_url: PageMeta::source_url_for(&site.base_url, rel_path),
        license: site.license.clone(),
    };
    let meta_path = dest.join(format!("{out_name}.meta.json"));
    let meta_json = serde_json::to_string_pretty(&meta)
        .map_err(|e| DocforgeError::parse(format!("sidecar serialization failed: {e}")))?;
    std::fs::write(&meta_path, meta_json).map_err(|e| DocforgeError::io(&meta_path, e))?;

    Ok(true)
}

/// Remove prior `*.html` and `*.meta.json` output from the destination.
fn clear_previous_output(dest: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dest).map_err(|e| DocforgeError::io(dest, e))? {
        let entry = entry.map_err(|e| DocforgeError::io(dest, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".html") || name.ends_with(".meta.json") {
            let path = entry.path();
            std::fs::remove_file(&path).map_err(|e| DocforgeError::io(&path, e))?;
        }
    }
    Ok(())
}
