//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod evaluate;
pub mod list;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate analysis results against a ground-truth timeline
    Evaluate(evaluate::EvaluateArgs),

    /// List match directories
    List(list::ListArgs),

    /// Check that every event record in a document normalizes
    Validate(validate::ValidateArgs),
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Evaluate(args) => args.execute(),
            Commands::List(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
        }
    }
}

/// Initialize logging based on verbosity level
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .try_init();
}
