//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docforge_core::{BuildConfig, BuildResult, ProgressReporter, run_build};
use docforge_playbook::{Playbook, discover_components};
use docforge_shared::{AppConfig, Checkout, SystemRunner, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docforge — aggregate documentation repositories into RAG-ready content.
#[derive(Parser)]
#[command(
    name = "docforge",
    version,
    about = "Aggregate documentation repositories into a site build and RAG-ready content records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full pipeline: clone, build, extract, ingest, dump.
    Build {
        /// Path to the upstream site descriptor (YAML with content.sources).
        descriptor: PathBuf,

        /// Work directory for checkouts and the site build (defaults to config).
        #[arg(long)]
        work_dir: Option<String>,

        /// Destination directory for extracted content (defaults to config).
        #[arg(long)]
        content_dir: Option<String>,

        /// Keep the work directory after a successful run.
        #[arg(long)]
        keep_work: bool,

        /// Stop after extraction; skip the downstream ingestion sequence.
        #[arg(long)]
        skip_ingest: bool,
    },

    /// Extract content records from an already-built site tree.
    Extract {
        /// Root of the generated site output.
        site_root: PathBuf,

        /// Destination directory (defaults to config).
        #[arg(long)]
        out: Option<String>,
    },

    /// Re-synthesize the playbook from checkouts in an existing work directory.
    Playbook {
        /// Work directory holding the checkouts (defaults to config).
        #[arg(long)]
        work_dir: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docforge=info",
        1 => "docforge=debug",
        _ => "docforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            descriptor,
            work_dir,
            content_dir,
            keep_work,
            skip_ingest,
        } => cmd_build(
            descriptor,
            work_dir.as_deref(),
            content_dir.as_deref(),
            keep_work,
            skip_ingest,
        ),
        Command::Extract { site_root, out } => cmd_extract(&site_root, out.as_deref()),
        Command::Playbook { work_dir } => cmd_playbook(work_dir.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(
    descriptor: PathBuf,
    work_dir: Option<&str>,
    content_dir: Option<&str>,
    keep_work: bool,
    skip_ingest: bool,
) -> Result<()> {
    if !descriptor.exists() {
        return Err(eyre!(
            "site descriptor not found at '{}'",
            descriptor.display()
        ));
    }

    let mut app = load_config()?;
    if let Some(dir) = work_dir {
        app.build.work_dir = dir.to_string();
    }
    if let Some(dir) = content_dir {
        app.build.content_dir = dir.to_string();
    }

    let mut config = BuildConfig::new(descriptor, app);
    config.keep_work = keep_work;
    config.skip_ingest = skip_ingest;

    info!(
        descriptor = %config.descriptor.display(),
        keep_work,
        skip_ingest,
        "starting pipeline"
    );

    let reporter = CliProgress::new();
    let result = run_build(&config, &SystemRunner, &reporter)?;

    println!();
    println!("  Build complete!");
    println!("  Checkouts:  {}", result.checkouts);
    println!("  Components: {}", result.components);
    println!("  Pages:      {}", result.pages);
    if let Some(dump) = &result.dump_file {
        println!("  Dump:       {}", dump.display());
        println!();
        println!("  The dump is ready for distribution.");
        println!(
            "  Restore with: docs2db db-restore {}",
            dump.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_extract(site_root: &Path, out: Option<&str>) -> Result<()> {
    let app = load_config()?;
    let dest = out.unwrap_or(&app.build.content_dir);

    info!(site_root = %site_root.display(), dest, "extracting content");

    let report = docforge_extract::extract_tree(site_root, Path::new(dest), &app.site)?;

    println!("  Extracted {} pages to {dest}", report.extracted);
    println!("  Without content: {}", report.skipped_no_content.len());
    println!("  Failed:          {}", report.failed.len());

    Ok(())
}

fn cmd_playbook(work_dir: Option<&str>) -> Result<()> {
    let app = load_config()?;
    let work_dir = PathBuf::from(work_dir.unwrap_or(&app.build.work_dir));
    if !work_dir.is_dir() {
        return Err(eyre!("work directory '{}' not found", work_dir.display()));
    }

    // Every subdirectory of the work directory is a checkout.
    let mut checkouts: Vec<Checkout> = std::fs::read_dir(&work_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| Checkout {
            name: e.file_name().to_string_lossy().into_owned(),
            local_path: e.path(),
            origin_url: String::new(),
        })
        .collect();
    checkouts.sort_by(|a, b| a.name.cmp(&b.name));

    let discovery = discover_components(&checkouts)?;
    for dup in &discovery.duplicates {
        println!(
            "  skipped duplicate component '{}' at {}",
            dup.name, dup.location
        );
    }
    for name in &discovery.no_manifest {
        println!("  no manifest found in {name}");
    }

    let playbook = Playbook::synthesize(&app.site, &discovery.accepted)?;
    let path = playbook.write(&work_dir)?;

    println!(
        "  Wrote {} with {} sources",
        path.display(),
        discovery.accepted.len()
    );

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Prints numbered stage headers and post-stage summary lines, with an
/// indicatif spinner for the long-running stages.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn step(&self, current: usize, total: usize, name: &str) {
        self.spinner.println(format!("\n[{current}/{total}] {name}..."));
        self.spinner.set_message(name.to_string());
    }

    fn detail(&self, text: &str) {
        self.spinner.println(format!("  {text}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
