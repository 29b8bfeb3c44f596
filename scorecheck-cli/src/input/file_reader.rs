//! Document loading utilities

use crate::error::CliError;
use anyhow::{Context, Result};
use scorecheck_core::{AnalysisRun, GroundTruthDocument};
use std::fs;
use std::path::Path;

/// Reads ground-truth and analysis-run documents from disk
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(content)
    }

    /// Read a ground-truth document
    pub fn read_ground_truth(path: &Path) -> Result<GroundTruthDocument> {
        let content = Self::read_text(path)?;
        GroundTruthDocument::from_json_str(&content)
            .with_context(|| format!("Invalid ground-truth document: {}", path.display()))
    }

    /// Read an analysis run, with or without the `analysis` wrapper
    pub fn read_run(path: &Path) -> Result<AnalysisRun> {
        let content = Self::read_text(path)?;
        AnalysisRun::from_json_str(&content)
            .with_context(|| format!("Invalid result document: {}", path.display()))
    }
}
