//! List command implementation

use crate::input::list_matches;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Directory containing one subdirectory per match
    #[arg(long, value_name = "DIR", default_value = "matches")]
    pub matches_dir: PathBuf,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self) -> Result<()> {
        let matches = list_matches(&self.matches_dir)?;

        if matches.is_empty() {
            println!("No matches found.");
            return Ok(());
        }

        println!("Available matches:");
        for entry in matches {
            println!("  {}: {}", entry.video_id, entry.title);
        }

        Ok(())
    }
}
