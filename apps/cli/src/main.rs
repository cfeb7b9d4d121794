//! docforge CLI — documentation fleet aggregation tool.
//!
//! Aggregates independent documentation repositories into a single static
//! site build and distills the result into per-page content records for
//! downstream RAG ingestion.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
