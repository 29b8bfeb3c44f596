//! Output formatting module

use crate::config::OutputConfig;
use anyhow::Result;
use scorecheck_core::{Athlete, Evaluation, Event, RejectedRecord};
use std::io::Write;

/// Trait for report formatters
pub trait ReportFormatter: Send + Sync {
    /// Format the evaluation of one result file
    fn format_evaluation(&mut self, source: &str, evaluation: &Evaluation) -> Result<()>;

    /// Finalize output (summary table, closing JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report per result file
    Text,
    /// JSON array with the full evaluation of every result file
    Json,
    /// Markdown tables
    Markdown,
}

/// Create the formatter for `format`
pub fn create_formatter<W>(
    format: OutputFormat,
    writer: W,
    config: &OutputConfig,
) -> Box<dyn ReportFormatter>
where
    W: Write + Send + Sync + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer, config.show_details)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer, config.pretty_json)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer, config.show_details)),
    }
}

/// One line of the multi-file comparison table
#[derive(Debug, Clone)]
pub(crate) struct SummaryRow {
    pub source: String,
    pub model: String,
    pub resolution: String,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl SummaryRow {
    pub(crate) fn new(source: &str, evaluation: &Evaluation) -> Self {
        Self {
            source: source.to_string(),
            model: evaluation.model.clone(),
            resolution: short_resolution(&evaluation.media_resolution).to_string(),
            f1: evaluation.result.f1_score(),
            precision: evaluation.result.precision(),
            recall: evaluation.result.recall(),
        }
    }
}

/// One entry of the per-event detail listing
///
/// Indices are positions in the raw documents, so they line up with the
/// skipped-record listing when lenient normalization dropped records.
#[derive(Debug)]
pub(crate) enum Detail<'a> {
    Matched {
        gt_index: usize,
        pred_index: usize,
        ground_truth: &'a Event,
        predicted: &'a Event,
    },
    Missed {
        index: usize,
        event: &'a Event,
    },
    Extra {
        index: usize,
        event: &'a Event,
    },
}

/// Ground-truth events in order (matched or missed), then unmatched predictions
pub(crate) fn details(evaluation: &Evaluation) -> Vec<Detail<'_>> {
    let result = &evaluation.result;
    let mut details = Vec::with_capacity(result.ground_truth_count + result.false_positives.len());

    for (index, event) in evaluation.ground_truth.iter().enumerate() {
        match result.pair_for_ground_truth(index) {
            Some(pair) => details.push(Detail::Matched {
                gt_index: evaluation.gt_source_index(index),
                pred_index: evaluation.pred_source_index(pair.pred_index),
                ground_truth: event,
                predicted: &evaluation.predicted[pair.pred_index],
            }),
            None => details.push(Detail::Missed {
                index: evaluation.gt_source_index(index),
                event,
            }),
        }
    }

    for &index in &result.false_positives {
        details.push(Detail::Extra {
            index: evaluation.pred_source_index(index),
            event: &evaluation.predicted[index],
        });
    }

    details
}

/// Records skipped by lenient normalization, labelled `GT` or `Pred`
pub(crate) fn skipped_records(
    evaluation: &Evaluation,
) -> impl Iterator<Item = (&'static str, &RejectedRecord)> {
    evaluation
        .rejected_ground_truth
        .iter()
        .map(|r| ("GT", r))
        .chain(evaluation.rejected_predicted.iter().map(|r| ("Pred", r)))
}

/// `MEDIA_RESOLUTION_LOW` -> `LOW`
pub(crate) fn short_resolution(resolution: &str) -> &str {
    resolution
        .strip_prefix("MEDIA_RESOLUTION_")
        .unwrap_or(resolution)
}

pub(crate) fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Accuracy that may be undefined
pub(crate) fn optional_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), percent)
}

pub(crate) fn check(correct: bool) -> &'static str {
    if correct {
        "✓"
    } else {
        "✗"
    }
}

/// First name of the athlete, or the side letter when names are unknown
pub(crate) fn athlete_label(evaluation: &Evaluation, athlete: Athlete) -> String {
    let name = match athlete {
        Athlete::A => &evaluation.athlete_1_name,
        Athlete::B => &evaluation.athlete_2_name,
    };
    name.split_whitespace()
        .next()
        .map_or_else(|| athlete.to_string(), str::to_string)
}

pub(crate) fn clock_label(event: &Event) -> &str {
    event.match_clock.as_ref().map_or("?", |clock| clock.as_str())
}
