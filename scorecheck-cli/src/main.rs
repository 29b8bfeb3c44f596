//! Command-line entry point for scorecheck

use anyhow::Result;
use clap::Parser;
use scorecheck_cli::commands::Commands;

/// Evaluate extracted match timelines against ground truth
#[derive(Debug, Parser)]
#[command(name = "scorecheck", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    Cli::parse().command.execute()
}
