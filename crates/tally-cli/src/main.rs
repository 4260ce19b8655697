//! Tally CLI - bank-statement spending analyzer
//!
//! Usage:
//!   tally parse statement.csv        Parse files and show diagnostics
//!   tally analyze *.csv --ai         Run the full pipeline and report
//!   tally categories                 List the budget categories

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Parse { files } => commands::cmd_parse(&files),
        Commands::Analyze { files, ai, json } => commands::cmd_analyze(&files, ai, json).await,
        Commands::Categories => commands::cmd_categories(),
    }
}
