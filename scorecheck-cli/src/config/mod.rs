//! Configuration module
//!
//! Settings are read from a TOML file passed with `--config`. Every section is
//! optional; command-line flags override whatever the file sets.
//!
//! ```toml
//! [evaluation]
//! tolerance_seconds = 5.0
//! strategy = "greedy"
//! lenient = false
//!
//! [output]
//! default_format = "text"
//! pretty_json = true
//! show_details = true
//!
//! [performance]
//! worker_threads = 0
//! ```

use crate::error::CliError;
use anyhow::{Context, Result};
use scorecheck_core::EvalConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Matching configuration
    #[serde(default)]
    pub evaluation: EvalConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl CliConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CliConfig = toml::from_str(&content)
            .map_err(|e| CliError::ConfigError(e.to_string()))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .evaluation
            .validate()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;

        Ok(config)
    }
}

/// Output-related configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub default_format: String,

    /// Pretty print JSON output
    pub pretty_json: bool,

    /// List every pair, miss and false positive in text and markdown reports
    pub show_details: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            pretty_json: true,
            show_details: true,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}
