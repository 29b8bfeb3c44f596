//! Document-level evaluation
//!
//! Glue between the raw documents and the matcher: resolve the roster from the
//! ground truth, normalize both event lists, align them, and compare the
//! whole-match facts.

use crate::config::EvalConfig;
use crate::document::{AnalysisRun, GroundTruthDocument, MatchLevelMetrics};
use crate::error::Result;
use crate::event::Event;
use crate::normalize::{LenientBatch, Normalizer, RejectedRecord, Roster};
use crate::report::MatchResult;
use serde::Serialize;
use serde_json::Value;

/// Evaluation of one analysis run against its ground truth
///
/// With lenient normalization, indices in `result` refer to the surviving
/// events, not to positions in the raw documents. `ground_truth_sources` and
/// `predicted_sources` map them back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Model that produced the run
    pub model: String,
    /// Media resolution the run was produced at
    pub media_resolution: String,
    /// Ground-truth name of athlete A
    pub athlete_1_name: String,
    /// Ground-truth name of athlete B
    pub athlete_2_name: String,
    /// Normalized ground-truth events
    pub gt_event_count: usize,
    /// Normalized predicted events
    pub pred_event_count: usize,
    /// Normalized ground-truth events, indexed by `result`
    pub ground_truth: Vec<Event>,
    /// Normalized predicted events, indexed by `result`
    pub predicted: Vec<Event>,
    /// Raw record position of each entry in `ground_truth`
    pub ground_truth_sources: Vec<usize>,
    /// Raw record position of each entry in `predicted`
    pub predicted_sources: Vec<usize>,
    /// Ground-truth records skipped by lenient normalization
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_ground_truth: Vec<RejectedRecord>,
    /// Predicted records skipped by lenient normalization
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_predicted: Vec<RejectedRecord>,
    /// Alignment and event-level metrics
    pub result: MatchResult,
    /// Final score and winner comparison
    pub match_level: MatchLevelMetrics,
}

impl Evaluation {
    /// Raw ground-truth record position of normalized event `index`
    pub fn gt_source_index(&self, index: usize) -> usize {
        self.ground_truth_sources.get(index).copied().unwrap_or(index)
    }

    /// Raw predicted record position of normalized event `index`
    pub fn pred_source_index(&self, index: usize) -> usize {
        self.predicted_sources.get(index).copied().unwrap_or(index)
    }
}

/// Evaluate an analysis run against a ground-truth document
pub fn evaluate_documents(
    ground_truth: &GroundTruthDocument,
    run: &AnalysisRun,
    config: &EvalConfig,
) -> Result<Evaluation> {
    let matcher = config.matcher()?;
    let normalizer = Normalizer::with_roster(Roster::new(
        &ground_truth.athlete_1_name,
        &ground_truth.athlete_2_name,
    ));

    let gt = normalize_side(&normalizer, &ground_truth.events, config.lenient)?;
    let pred = normalize_side(&normalizer, &run.analysis.events, config.lenient)?;

    let result = matcher.evaluate(&gt.events, &pred.events)?;

    tracing::info!(
        model = %run.model,
        matched = result.matched_count(),
        precision = result.precision(),
        recall = result.recall(),
        f1 = result.f1_score(),
        "evaluated analysis run"
    );

    Ok(Evaluation {
        model: run.model.clone(),
        media_resolution: run.media_resolution.clone(),
        athlete_1_name: ground_truth.athlete_1_name.clone(),
        athlete_2_name: ground_truth.athlete_2_name.clone(),
        gt_event_count: gt.events.len(),
        pred_event_count: pred.events.len(),
        ground_truth: gt.events,
        predicted: pred.events,
        ground_truth_sources: gt.source_indices,
        predicted_sources: pred.source_indices,
        rejected_ground_truth: gt.rejected,
        rejected_predicted: pred.rejected,
        result,
        match_level: MatchLevelMetrics::compare(ground_truth, &run.analysis),
    })
}

fn normalize_side(
    normalizer: &Normalizer,
    raws: &[Value],
    lenient: bool,
) -> Result<LenientBatch> {
    if lenient {
        return Ok(normalizer.normalize_lenient(raws));
    }

    let events = normalizer.normalize_all(raws)?;
    Ok(LenientBatch {
        source_indices: (0..events.len()).collect(),
        events,
        rejected: Vec::new(),
    })
}
