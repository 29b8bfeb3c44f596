//! Validate command implementation

use super::init_logging;
use crate::error::CliError;
use crate::input::FileReader;
use anyhow::Result;
use clap::Args;
use scorecheck_core::{Normalizer, Roster};
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Ground-truth or result document to validate
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        // Rejections are reported below, so normalizer warnings stay quiet
        init_logging(self.verbose, self.verbose == 0);

        println!("Validating events: {}", self.file.display());

        // A ground-truth file reads as a bare analysis
        let run = FileReader::read_run(&self.file)?;
        let analysis = &run.analysis;
        let normalizer =
            Normalizer::with_roster(Roster::new(&analysis.athlete_1_name, &analysis.athlete_2_name));
        let batch = normalizer.normalize_lenient(&analysis.events);

        if batch.rejected.is_empty() {
            println!("✓ All {} event(s) are valid", batch.events.len());
            return Ok(());
        }

        println!(
            "✗ {} of {} event(s) are invalid",
            batch.rejected.len(),
            analysis.events.len()
        );
        for record in &batch.rejected {
            println!("  event {}: {}", record.index, record.error);
        }

        Err(CliError::InvalidRecords(batch.rejected.len()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn document(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_args_debug() {
        let args = ValidateArgs {
            file: PathBuf::from("ground_truth.json"),
            verbose: 0,
        };

        let debug_str = format!("{:?}", args);
        assert!(debug_str.contains("ValidateArgs"));
        assert!(debug_str.contains("ground_truth.json"));
    }

    #[test]
    fn test_valid_document() {
        let file = document(
            r#"{"athlete_1_name": "Ana Silva", "athlete_2_name": "Bea Costa",
                "events": [{"timestamp_seconds": 10, "athlete": "Ana Silva"}]}"#,
        );
        let args = ValidateArgs {
            file: file.path().to_path_buf(),
            verbose: 0,
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_invalid_records_fail() {
        let file = document(
            r#"{"model": "m", "analysis": {"events": [
                {"timestamp_seconds": 10, "athlete": "A"},
                {"timestamp_seconds": -1, "athlete": "A"},
                {"athlete": "B"}
            ]}}"#,
        );
        let args = ValidateArgs {
            file: file.path().to_path_buf(),
            verbose: 0,
        };

        let err = args.execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::InvalidRecords(2))
        ));
    }
}
