//! Evaluate command implementation

use super::init_logging;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader, MatchDirectory};
use crate::output::{create_formatter, OutputFormat};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use scorecheck_core::{evaluate_batch, AnalysisRun, BatchJob, EvalConfig, StrategyKind};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Arguments for the evaluate command
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Ground-truth document
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "match_dir",
        requires = "result"
    )]
    pub ground_truth: Option<PathBuf>,

    /// Result files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", num_args = 1..)]
    pub result: Vec<String>,

    /// Match directory holding ground_truth.json and results/*.json
    #[arg(
        short,
        long,
        value_name = "DIR",
        conflicts_with_all = ["ground_truth", "result"]
    )]
    pub match_dir: Option<PathBuf>,

    /// Timestamp tolerance in seconds
    #[arg(short, long, value_name = "SECONDS")]
    pub tolerance: Option<f64>,

    /// Assignment strategy
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Skip malformed event records instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads for evaluating several result files
    #[arg(short, long, value_name = "N", env = "SCORECHECK_JOBS")]
    pub jobs: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Assignment strategies selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Nearest pairs first, one-to-one
    Greedy,
    /// Ground-truth events in order, each taking its nearest free prediction
    GtOrder,
    /// Maximum number of pairs
    MaxCardinality,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => StrategyKind::Greedy,
            StrategyArg::GtOrder => StrategyKind::GtOrder,
            StrategyArg::MaxCardinality => StrategyKind::MaxCardinality,
        }
    }
}

impl EvaluateArgs {
    /// Execute the evaluate command
    pub fn execute(&self) -> Result<()> {
        init_logging(self.verbose, self.quiet);

        log::info!("Starting evaluation");
        log::debug!("Arguments: {:?}", self);

        let config = match &self.config {
            Some(path) => CliConfig::from_file(path)?,
            None => CliConfig::default(),
        };
        let eval_config = self.eval_config(&config)?;
        let format = self.output_format(&config)?;

        let (gt_path, result_paths) = self.resolve_sources()?;
        log::info!(
            "Evaluating {} result file(s) against {}",
            result_paths.len(),
            gt_path.display()
        );

        let ground_truth = FileReader::read_ground_truth(&gt_path)?;

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(result_paths.len() as u64);
        let mut runs: Vec<(String, AnalysisRun)> = Vec::with_capacity(result_paths.len());
        for path in &result_paths {
            let name = display_name(path);
            runs.push((name.clone(), FileReader::read_run(path)?));
            progress.file_completed(&name);
        }
        progress.finish();

        let jobs: Vec<BatchJob<'_>> = runs
            .iter()
            .map(|(_, run)| BatchJob::new(&ground_truth, run))
            .collect();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads(&config))
            .build()
            .context("Failed to create worker pool")?;
        let evaluations = pool.install(|| evaluate_batch(&jobs, &eval_config));

        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(io::stdout()),
        };
        let mut formatter = create_formatter(format, writer, &config.output);

        for ((name, _), evaluation) in runs.iter().zip(evaluations) {
            let evaluation = evaluation
                .map_err(|e| CliError::EvaluationError(e.to_string()))
                .with_context(|| format!("Failed to evaluate {name}"))?;
            formatter.format_evaluation(name, &evaluation)?;
        }
        formatter.finish()?;

        log::info!("Evaluation complete");
        Ok(())
    }

    /// Merge flags over the config file
    fn eval_config(&self, config: &CliConfig) -> Result<EvalConfig> {
        EvalConfig::builder()
            .tolerance_seconds(self.tolerance.unwrap_or(config.evaluation.tolerance_seconds))
            .strategy(
                self.strategy
                    .map(StrategyKind::from)
                    .unwrap_or(config.evaluation.strategy),
            )
            .lenient(self.lenient || config.evaluation.lenient)
            .build()
            .map_err(|e| CliError::ConfigError(e.to_string()).into())
    }

    fn output_format(&self, config: &CliConfig) -> Result<OutputFormat> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        <OutputFormat as ValueEnum>::from_str(&config.output.default_format, true).map_err(|_| {
            CliError::ConfigError(format!(
                "unknown output format '{}'",
                config.output.default_format
            ))
            .into()
        })
    }

    fn worker_threads(&self, config: &CliConfig) -> usize {
        match self.jobs.unwrap_or(config.performance.worker_threads) {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// Ground-truth path and result files, newest first for match directories
    fn resolve_sources(&self) -> Result<(PathBuf, Vec<PathBuf>)> {
        if let Some(dir) = &self.match_dir {
            let match_dir = MatchDirectory::new(dir);
            let gt_path = match_dir.ground_truth_path();
            if !gt_path.is_file() {
                return Err(CliError::FileNotFound(gt_path.display().to_string()).into());
            }
            return Ok((gt_path, match_dir.result_files()?));
        }

        let gt_path = self
            .ground_truth
            .clone()
            .ok_or_else(|| CliError::ConfigError("--ground-truth is required".to_string()))?;
        Ok((gt_path, resolve_patterns(&self.result)?))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
