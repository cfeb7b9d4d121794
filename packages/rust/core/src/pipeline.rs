//! End-to-end build pipeline: descriptor → checkouts → playbook → site build
//! → extraction → downstream ingestion.
//!
//! Strictly sequential: each stage fully completes before the next begins.
//! Stage outcomes are reported through [`ProgressReporter`] so a partial run
//! is diagnosable without re-running with added verbosity.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use docforge_playbook::{Playbook, SITE_OUTPUT_DIR, discover_components};
use docforge_shared::{AppConfig, CommandRunner, DocforgeError, Result};

use crate::antora;
use crate::ingest::Ingestor;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Path to the upstream site descriptor.
    pub descriptor: PathBuf,
    /// Resolved application config.
    pub app: AppConfig,
    /// Preserve the work directory even on success.
    pub keep_work: bool,
    /// Stop after extraction; skip the downstream ingestion sequence.
    pub skip_ingest: bool,
    /// Settle delay after starting the datastore.
    pub db_settle: Duration,
}

impl BuildConfig {
    /// Build a config with default run options.
    pub fn new(descriptor: PathBuf, app: AppConfig) -> Self {
        Self {
            descriptor,
            app,
            keep_work: false,
            skip_ingest: false,
            db_settle: Duration::from_secs(5),
        }
    }
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of resolved checkouts.
    pub checkouts: usize,
    /// Number of accepted components in the playbook.
    pub components: usize,
    /// Number of extracted content records.
    pub pages: usize,
    /// Path of the database dump, when ingestion ran.
    pub dump_file: Option<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called when entering a numbered stage.
    fn step(&self, current: usize, total: usize, name: &str);
    /// Called with post-stage summary lines (counts, skips, failures).
    fn detail(&self, text: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step(&self, _current: usize, _total: usize, _name: &str) {}
    fn detail(&self, _text: &str) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full pipeline.
///
/// The work directory is removed after extraction on the success path
/// (unless `keep_work` is set) and preserved on failure for diagnosis.
#[instrument(skip_all, fields(descriptor = %config.descriptor.display()))]
pub fn run_build(
    config: &BuildConfig,
    runner: &dyn CommandRunner,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();
    let total = if config.skip_ingest { 4 } else { 12 };

    let work_dir = Path::new(&config.app.build.work_dir);
    let content_dir = Path::new(&config.app.build.content_dir);

    let runtime = antora::check_prerequisites(runner)?;

    // --- Stage 1: resolve repositories ---
    progress.step(1, total, "Resolving documentation repositories");
    let sources = docforge_resolver::read_descriptor(&config.descriptor)?;
    if sources.is_empty() {
        return Err(DocforgeError::validation(
            "site descriptor declares no usable sources",
        ));
    }
    let resolved = docforge_resolver::resolve(&sources, work_dir, runner)?;
    progress.detail(&format!(
        "{} checkouts ({} cloned, {} refreshed, {} stale, {} failed)",
        resolved.checkouts.len(),
        resolved.cloned.len(),
        resolved.refreshed.len(),
        resolved.stale.len(),
        resolved.failed.len(),
    ));
    for name in &resolved.failed {
        progress.detail(&format!("failed to clone {name}"));
    }

    // --- Stage 2: discover components, synthesize playbook ---
    progress.step(2, total, "Synthesizing build playbook");
    let discovery = discover_components(&resolved.checkouts)?;
    for dup in &discovery.duplicates {
        progress.detail(&format!(
            "skipped duplicate component '{}' at {}",
            dup.name, dup.location
        ));
    }
    for name in &discovery.no_manifest {
        progress.detail(&format!("no manifest found in {name}"));
    }
    let playbook = Playbook::synthesize(&config.app.site, &discovery.accepted)?;
    playbook.write(work_dir)?;
    progress.detail(&format!("{} sources accepted", discovery.accepted.len()));

    // --- Stage 3: external site build ---
    progress.step(3, total, "Building site (this may take several minutes)");
    antora::build_site(runner, &runtime, &config.app.build.antora_image, work_dir)?;

    // --- Stage 4: content extraction ---
    progress.step(4, total, "Extracting page content");
    let site_root = work_dir.join(SITE_OUTPUT_DIR.trim_start_matches("./"));
    let extracted = docforge_extract::extract_tree(&site_root, content_dir, &config.app.site)?;
    progress.detail(&format!(
        "{} pages extracted, {} without content, {} failed",
        extracted.extracted,
        extracted.skipped_no_content.len(),
        extracted.failed.len(),
    ));

    // Checkouts and the generated site are no longer needed.
    if config.keep_work {
        info!(work_dir = %work_dir.display(), "keeping work directory");
    } else if let Err(e) = std::fs::remove_dir_all(work_dir) {
        warn!(work_dir = %work_dir.display(), error = %e, "could not remove work directory");
    }

    // --- Stages 5–12: downstream ingestion contract ---
    let dump_file = if config.skip_ingest {
        None
    } else {
        Some(run_ingestion(config, runner, progress, content_dir, total)?)
    };

    let result = BuildResult {
        checkouts: resolved.checkouts.len(),
        components: discovery.accepted.len(),
        pages: extracted.extracted,
        dump_file,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        checkouts = result.checkouts,
        components = result.components,
        pages = result.pages,
        elapsed_ms = result.elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(result)
}

/// Run the fixed ingestion sequence. Returns the dump file path.
fn run_ingestion(
    config: &BuildConfig,
    runner: &dyn CommandRunner,
    progress: &dyn ProgressReporter,
    content_dir: &Path,
    total: usize,
) -> Result<PathBuf> {
    let ingestor = Ingestor::new(runner, &config.app.ingest)?;

    progress.step(5, total, "Ingesting content");
    if let Err(e) = ingestor.ingest(content_dir) {
        // Re-ingesting already-known documents reports errors; not fatal.
        warn!(error = %e, "ingest reported issues, continuing");
        progress.detail("ingest reported issues, continuing");
    }

    progress.step(6, total, "Chunking documents");
    ingestor.chunk()?;

    progress.step(7, total, "Generating embeddings");
    ingestor.embed()?;

    progress.step(8, total, "Destroying existing database (if any)");
    ingestor.db_destroy();

    progress.step(9, total, "Starting database");
    ingestor.db_start()?;
    std::thread::sleep(config.db_settle);

    progress.step(10, total, "Loading into database");
    if let Err(e) = ingestor.load(
        &config.app.ingest.dataset_title,
        &config.app.ingest.dataset_description,
    ) {
        let _ = ingestor.db_stop();
        return Err(e);
    }

    progress.step(11, total, "Creating database dump");
    let dump_file = Path::new(&config.app.build.output_dir).join(&config.app.ingest.dump_file);
    if let Err(e) = ingestor.db_dump(&dump_file) {
        let _ = ingestor.db_stop();
        return Err(e);
    }

    progress.step(12, total, "Stopping database");
    if let Err(e) = ingestor.db_stop() {
        warn!(error = %e, "db-stop failed");
    }

    Ok(dump_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use docforge_shared::{CommandOutput, Invocation};

    const ARTICLE_PAGE: &str = concat!(
        "<html><head><title>X</title></head><body>",
        "<article class=\"doc\"><p>content</p></article>",
        "</body></html>"
    );

    /// Fake runner scripted by a closure; records every invocation.
    struct ScriptedRunner<F>
    where
        F: Fn(&Invocation) -> CommandOutput,
    {
        calls: RefCell<Vec<Invocation>>,
        script: F,
    }

    impl<F> CommandRunner for ScriptedRunner<F>
    where
        F: Fn(&Invocation) -> CommandOutput,
    {
        fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
            let invocation = Invocation {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                cwd: cwd.map(Path::to_path_buf),
            };
            let output = (self.script)(&invocation);
            self.calls.borrow_mut().push(invocation);
            Ok(output)
        }
    }

    /// A runner that simulates a working environment: clones create a
    /// checkout with a root manifest, the container build writes one page.
    fn working_runner(
        work_dir: PathBuf,
        fail_op: Option<&'static str>,
    ) -> ScriptedRunner<impl Fn(&Invocation) -> CommandOutput> {
        ScriptedRunner {
            calls: RefCell::new(Vec::new()),
            script: move |inv: &Invocation| {
                if let Some(op) = fail_op {
                    if inv.args.iter().any(|a| a == op) {
                        return CommandOutput::failed("scripted failure");
                    }
                }
                if inv.program == "git" && inv.args.first().map(String::as_str) == Some("clone") {
                    let target = PathBuf::from(inv.args.last().expect("clone target"));
                    std::fs::create_dir_all(&target).expect("create checkout");
                    std::fs::write(target.join("antora.yml"), "name: quick-docs\n")
                        .expect("write manifest");
                }
                if inv.args.first().map(String::as_str) == Some("run") && inv.program != "uv" {
                    let public = work_dir.join("public");
                    std::fs::create_dir_all(&public).expect("create public");
                    std::fs::write(public.join("x.html"), ARTICLE_PAGE).expect("write page");
                }
                CommandOutput::ok()
            },
        }
    }

    fn test_config(root: &Path) -> BuildConfig {
        let descriptor = root.join("site-descriptor.yml");
        std::fs::write(
            &descriptor,
            "content:\n  sources:\n    - url: https://pagure.io/fedora-docs/quick-docs.git\n",
        )
        .expect("write descriptor");

        let mut app = AppConfig::default();
        app.build.work_dir = root.join("build").to_string_lossy().into_owned();
        app.build.content_dir = root.join("content").to_string_lossy().into_owned();
        app.build.output_dir = root.join("dist").to_string_lossy().into_owned();

        BuildConfig {
            descriptor,
            app,
            keep_work: false,
            skip_ingest: false,
            db_settle: Duration::ZERO,
        }
    }

    #[test]
    fn full_run_extracts_and_ingests() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(tmp.path());
        let work_dir = PathBuf::from(&config.app.build.work_dir);
        let runner = working_runner(work_dir.clone(), None);

        let result = run_build(&config, &runner, &SilentProgress).expect("run");

        assert_eq!(result.checkouts, 1);
        assert_eq!(result.components, 1);
        assert_eq!(result.pages, 1);
        assert_eq!(
            result.dump_file.as_deref(),
            Some(tmp.path().join("dist/fedora-docs.sql").as_path())
        );

        // Work directory removed on success; content preserved.
        assert!(!work_dir.exists());
        assert!(tmp.path().join("content/x.html").exists());

        // Ingestion contract runs in order and ends with db-stop.
        let calls = runner.calls.borrow();
        let ops: Vec<String> = calls
            .iter()
            .filter(|c| c.program == "uv")
            .map(|c| c.args[2].clone())
            .collect();
        assert_eq!(
            ops,
            [
                "ingest", "chunk", "embed", "db-destroy", "db-start", "load", "db-dump", "db-stop"
            ]
        );
    }

    #[test]
    fn skip_ingest_stops_after_extraction() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(tmp.path());
        config.skip_ingest = true;
        let work_dir = PathBuf::from(&config.app.build.work_dir);
        let runner = working_runner(work_dir, None);

        let result = run_build(&config, &runner, &SilentProgress).expect("run");

        assert_eq!(result.pages, 1);
        assert!(result.dump_file.is_none());
        assert!(!runner.calls.borrow().iter().any(|c| c.program == "uv"));
    }

    #[test]
    fn keep_work_preserves_work_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(tmp.path());
        config.keep_work = true;
        config.skip_ingest = true;
        let work_dir = PathBuf::from(&config.app.build.work_dir);
        let runner = working_runner(work_dir.clone(), None);

        run_build(&config, &runner, &SilentProgress).expect("run");
        assert!(work_dir.join("site.yml").exists());
    }

    #[test]
    fn failed_site_build_preserves_work_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(tmp.path());
        let work_dir = PathBuf::from(&config.app.build.work_dir);
        let runner = ScriptedRunner {
            calls: RefCell::new(Vec::new()),
            script: |inv: &Invocation| {
                if inv.program == "git" && inv.args.first().map(String::as_str) == Some("clone") {
                    let target = PathBuf::from(inv.args.last().expect("clone target"));
                    std::fs::create_dir_all(&target).expect("create checkout");
                    std::fs::write(target.join("antora.yml"), "name: quick-docs\n")
                        .expect("write manifest");
                    return CommandOutput::ok();
                }
                if inv.args.first().map(String::as_str) == Some("run") {
                    return CommandOutput::failed("generator crashed");
                }
                CommandOutput::ok()
            },
        };

        let err = run_build(&config, &runner, &SilentProgress).unwrap_err();
        assert!(err.to_string().contains("site build failed"));
        assert!(work_dir.exists());
    }

    #[test]
    fn load_failure_stops_database_before_aborting() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = test_config(tmp.path());
        let work_dir = PathBuf::from(&config.app.build.work_dir);
        let runner = working_runner(work_dir, Some("load"));

        let err = run_build(&config, &runner, &SilentProgress).unwrap_err();
        assert!(err.to_string().contains("load"));

        let calls = runner.calls.borrow();
        let last_uv = calls.iter().rev().find(|c| c.program == "uv").expect("uv call");
        assert!(last_uv.args.contains(&"db-stop".to_string()));
    }

    #[test]
    fn empty_descriptor_is_fatal_before_any_clone() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(tmp.path());
        std::fs::write(&config.descriptor, "content:\n  sources: []\n").expect("write");
        config.skip_ingest = true;
        let runner = working_runner(PathBuf::from(&config.app.build.work_dir), None);

        let err = run_build(&config, &runner, &SilentProgress).unwrap_err();
        assert!(err.to_string().contains("no usable sources"));
        let cloned = runner
            .calls
            .borrow()
            .iter()
            .any(|c| c.args.first().map(String::as_str) == Some("clone"));
        assert!(!cloned);
    }
}
