//! CLI argument definitions using clap
//!
//! The command implementations live in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - categorize bank statements and analyze spending
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Bank-statement categorization and spending analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse statement files and report diagnostics
    Parse {
        /// Statement files (CSV, OFX, or QFX)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Run the full pipeline and print a spending report
    Analyze {
        /// Statement files (CSV, OFX, or QFX)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Categorize with the AI oracle (requires OLLAMA_HOST; falls back
        /// to rules when unset or unreachable)
        #[arg(long)]
        ai: bool,

        /// Emit the analysis as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// List the budget categories
    Categories,
}
