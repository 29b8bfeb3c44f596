//! Match results
//!
//! [`MatchResult`] is built fresh for every evaluation run from two complete
//! sequences. It holds the alignment and every metric derived from it, and
//! serializes to JSON for whatever report the caller renders.

use crate::error::Result;
use crate::event::Event;
use crate::matcher::{Alignment, Matcher, StrategyKind};
use crate::metrics::{
    calculate_clock_accuracy, calculate_field_accuracy, calculate_sequence_metrics,
    ClockAccuracy, DetectionMetrics, FieldAccuracy, FieldAgreement, ScoredField, SequenceMetrics,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One committed (ground truth, prediction) association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPair {
    /// Index into the ground-truth sequence
    pub gt_index: usize,
    /// Index into the predicted sequence
    pub pred_index: usize,
    /// Absolute timestamp difference in seconds
    pub distance_seconds: f64,
    /// Which scored fields agree
    pub fields: FieldAgreement,
}

/// Alignment of one predicted timeline against ground truth, with metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Tolerance window used for matching
    pub tolerance_seconds: f64,
    /// Assignment strategy used
    pub strategy: StrategyKind,
    /// Length of the ground-truth sequence
    pub ground_truth_count: usize,
    /// Length of the predicted sequence
    pub predicted_count: usize,
    /// Committed pairs, ordered by ground-truth index
    pub pairs: Vec<MatchPair>,
    /// Ground-truth indices without a match (false negatives), ascending
    pub misses: Vec<usize>,
    /// Predicted indices without a match, ascending
    pub false_positives: Vec<usize>,
    /// Precision, recall and F1
    pub detection: DetectionMetrics,
    /// Per-field accuracy over matched pairs
    pub field_accuracy: BTreeMap<ScoredField, FieldAccuracy>,
    /// Match clock error over matched pairs, when clocks are available
    pub clock_accuracy: Option<ClockAccuracy>,
    /// Relative ordering agreement of matched pairs
    pub sequence: SequenceMetrics,
}

impl MatchResult {
    /// Derive pairs and metrics from an alignment
    ///
    /// `alignment` must have been computed from these same two sequences.
    pub fn from_alignment(
        ground_truth: &[Event],
        predicted: &[Event],
        alignment: Alignment,
        matcher: &Matcher,
    ) -> Self {
        let pairs: Vec<MatchPair> = alignment
            .pairs
            .iter()
            .map(|c| MatchPair {
                gt_index: c.gt_index,
                pred_index: c.pred_index,
                distance_seconds: c.distance_seconds,
                fields: FieldAgreement::compare(
                    &ground_truth[c.gt_index],
                    &predicted[c.pred_index],
                ),
            })
            .collect();

        let detection = DetectionMetrics::from_counts(
            pairs.len(),
            alignment.false_positives.len(),
            alignment.misses.len(),
        );
        let field_accuracy = calculate_field_accuracy(pairs.iter().map(|p| &p.fields));
        let clock_accuracy = calculate_clock_accuracy(
            pairs
                .iter()
                .map(|p| (&ground_truth[p.gt_index], &predicted[p.pred_index])),
        );
        let index_pairs: Vec<(usize, usize)> =
            pairs.iter().map(|p| (p.gt_index, p.pred_index)).collect();
        let sequence = calculate_sequence_metrics(&index_pairs);

        Self {
            tolerance_seconds: matcher.tolerance_seconds(),
            strategy: matcher.strategy(),
            ground_truth_count: ground_truth.len(),
            predicted_count: predicted.len(),
            pairs,
            misses: alignment.misses,
            false_positives: alignment.false_positives,
            detection,
            field_accuracy,
            clock_accuracy,
            sequence,
        }
    }

    /// Number of matched pairs
    pub fn matched_count(&self) -> usize {
        self.pairs.len()
    }

    /// Precision of the predicted sequence
    pub fn precision(&self) -> f64 {
        self.detection.precision
    }

    /// Recall of the predicted sequence
    pub fn recall(&self) -> f64 {
        self.detection.recall
    }

    /// F1 score
    pub fn f1_score(&self) -> f64 {
        self.detection.f1_score
    }

    /// Accuracy of one field; `None` when nothing matched
    pub fn field_accuracy(&self, field: ScoredField) -> Option<f64> {
        self.field_accuracy.get(&field).and_then(|a| a.accuracy)
    }

    /// Pair containing a ground-truth index
    pub fn pair_for_ground_truth(&self, gt_index: usize) -> Option<&MatchPair> {
        self.pairs.iter().find(|p| p.gt_index == gt_index)
    }

    /// Pair containing a predicted index
    pub fn pair_for_prediction(&self, pred_index: usize) -> Option<&MatchPair> {
        self.pairs.iter().find(|p| p.pred_index == pred_index)
    }
}

impl Matcher {
    /// Align both sequences and compute all metrics
    pub fn evaluate(&self, ground_truth: &[Event], predicted: &[Event]) -> Result<MatchResult> {
        let alignment = self.align(ground_truth, predicted)?;
        Ok(MatchResult::from_alignment(
            ground_truth,
            predicted,
            alignment,
            self,
        ))
    }
}

/// Match `predicted` against `ground_truth` with the greedy strategy
///
/// Pass [`DEFAULT_TOLERANCE_SECONDS`](crate::DEFAULT_TOLERANCE_SECONDS) for
/// the standard five-second window.
pub fn match_events(
    ground_truth: &[Event],
    predicted: &[Event],
    tolerance_seconds: f64,
) -> Result<MatchResult> {
    Matcher::new(tolerance_seconds)?.evaluate(ground_truth, predicted)
}
