//! Accuracy metrics for timeline evaluation

use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Event detection metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    /// Matched pairs
    pub true_positives: usize,
    /// Predicted events left unmatched
    pub false_positives: usize,
    /// Ground-truth events left unmatched
    pub false_negatives: usize,
    /// Precision: TP / (TP + FP), 1.0 when nothing was predicted
    pub precision: f64,
    /// Recall: TP / (TP + FN), 1.0 when there is no ground truth
    pub recall: f64,
    /// F1 score: 2 * (precision * recall) / (precision + recall)
    pub f1_score: f64,
}

impl DetectionMetrics {
    /// Create metrics from raw counts
    pub fn from_counts(
        true_positives: usize,
        false_positives: usize,
        false_negatives: usize,
    ) -> Self {
        // An empty side cannot contribute errors, so its ratio is perfect
        let precision = if true_positives + false_positives > 0 {
            true_positives as f64 / (true_positives + false_positives) as f64
        } else {
            1.0
        };

        let recall = if true_positives + false_negatives > 0 {
            true_positives as f64 / (true_positives + false_negatives) as f64
        } else {
            1.0
        };

        let f1_score = if precision + recall > 0.0 {
            2.0 * (precision * recall) / (precision + recall)
        } else {
            0.0
        };

        Self {
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1_score,
        }
    }
}

/// Event fields compared on matched pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredField {
    /// `points_change`
    PointsChange,
    /// `advantages_change`
    AdvantagesChange,
    /// `penalties_change`
    PenaltiesChange,
    /// `running_score`
    RunningScore,
    /// `running_advantages`
    RunningAdvantages,
    /// `running_penalties`
    RunningPenalties,
}

impl ScoredField {
    /// Every scored field, in report order
    pub const ALL: [ScoredField; 6] = [
        ScoredField::PointsChange,
        ScoredField::AdvantagesChange,
        ScoredField::PenaltiesChange,
        ScoredField::RunningScore,
        ScoredField::RunningAdvantages,
        ScoredField::RunningPenalties,
    ];

    /// Field name as it appears in event records
    pub fn name(&self) -> &'static str {
        match self {
            ScoredField::PointsChange => "points_change",
            ScoredField::AdvantagesChange => "advantages_change",
            ScoredField::PenaltiesChange => "penalties_change",
            ScoredField::RunningScore => "running_score",
            ScoredField::RunningAdvantages => "running_advantages",
            ScoredField::RunningPenalties => "running_penalties",
        }
    }

    /// Exact equality of this field between two events
    pub fn agrees(&self, ground_truth: &Event, predicted: &Event) -> bool {
        match self {
            ScoredField::PointsChange => ground_truth.points_change == predicted.points_change,
            ScoredField::AdvantagesChange => {
                ground_truth.advantages_change == predicted.advantages_change
            }
            ScoredField::PenaltiesChange => {
                ground_truth.penalties_change == predicted.penalties_change
            }
            ScoredField::RunningScore => ground_truth.running_score == predicted.running_score,
            ScoredField::RunningAdvantages => {
                ground_truth.running_advantages == predicted.running_advantages
            }
            ScoredField::RunningPenalties => {
                ground_truth.running_penalties == predicted.running_penalties
            }
        }
    }
}

impl fmt::Display for ScoredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-field agreement flags for one matched pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldAgreement {
    /// `points_change` agrees
    pub points_change: bool,
    /// `advantages_change` agrees
    pub advantages_change: bool,
    /// `penalties_change` agrees
    pub penalties_change: bool,
    /// `running_score` agrees
    pub running_score: bool,
    /// `running_advantages` agrees
    pub running_advantages: bool,
    /// `running_penalties` agrees
    pub running_penalties: bool,
}

impl FieldAgreement {
    /// Compare every scored field
    pub fn compare(ground_truth: &Event, predicted: &Event) -> Self {
        let agrees = |field: ScoredField| field.agrees(ground_truth, predicted);
        Self {
            points_change: agrees(ScoredField::PointsChange),
            advantages_change: agrees(ScoredField::AdvantagesChange),
            penalties_change: agrees(ScoredField::PenaltiesChange),
            running_score: agrees(ScoredField::RunningScore),
            running_advantages: agrees(ScoredField::RunningAdvantages),
            running_penalties: agrees(ScoredField::RunningPenalties),
        }
    }

    /// Flag for one field
    pub fn get(&self, field: ScoredField) -> bool {
        match field {
            ScoredField::PointsChange => self.points_change,
            ScoredField::AdvantagesChange => self.advantages_change,
            ScoredField::PenaltiesChange => self.penalties_change,
            ScoredField::RunningScore => self.running_score,
            ScoredField::RunningAdvantages => self.running_advantages,
            ScoredField::RunningPenalties => self.running_penalties,
        }
    }

    /// Whether every scored field agrees
    pub fn all(&self) -> bool {
        ScoredField::ALL.iter().all(|&field| self.get(field))
    }
}

/// Accuracy of one field over matched pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldAccuracy {
    /// Pairs where the field agrees
    pub correct: usize,
    /// Matched pairs considered
    pub total: usize,
    /// `correct / total`; `None` when there are no matched pairs
    pub accuracy: Option<f64>,
}

impl FieldAccuracy {
    /// Create from counts
    pub fn from_counts(correct: usize, total: usize) -> Self {
        debug_assert!(correct <= total, "correct count exceeds total");
        Self {
            correct,
            total,
            accuracy: (total > 0).then(|| correct as f64 / total as f64),
        }
    }
}

/// Compute per-field accuracy from the agreement flags of matched pairs
pub fn calculate_field_accuracy<'a, I>(agreements: I) -> BTreeMap<ScoredField, FieldAccuracy>
where
    I: IntoIterator<Item = &'a FieldAgreement>,
{
    let mut correct = [0usize; ScoredField::ALL.len()];
    let mut total = 0;

    for agreement in agreements {
        total += 1;
        for (slot, field) in correct.iter_mut().zip(ScoredField::ALL) {
            if agreement.get(field) {
                *slot += 1;
            }
        }
    }

    ScoredField::ALL
        .into_iter()
        .zip(correct)
        .map(|(field, correct)| (field, FieldAccuracy::from_counts(correct, total)))
        .collect()
}

/// Match clock error over matched pairs whose clocks both parse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockAccuracy {
    /// Mean absolute clock difference in seconds
    pub mean_absolute_error: f64,
    /// Smallest clock difference in seconds
    pub min_error: u32,
    /// Largest clock difference in seconds
    pub max_error: u32,
    /// Number of pairs with two readable clocks
    pub matched_with_clock: usize,
}

/// Calculate clock accuracy over (ground truth, predicted) event pairs
///
/// Returns `None` when no pair carries two parseable clocks.
pub fn calculate_clock_accuracy<'a, I>(pairs: I) -> Option<ClockAccuracy>
where
    I: IntoIterator<Item = (&'a Event, &'a Event)>,
{
    let errors: Vec<u32> = pairs
        .into_iter()
        .filter_map(|(g, p)| {
            let g = g.match_clock.as_ref()?.seconds()?;
            let p = p.match_clock.as_ref()?.seconds()?;
            Some(g.abs_diff(p))
        })
        .collect();

    let min_error = *errors.iter().min()?;
    let max_error = *errors.iter().max()?;
    let sum: u64 = errors.iter().map(|&e| u64::from(e)).sum();

    Some(ClockAccuracy {
        mean_absolute_error: sum as f64 / errors.len() as f64,
        min_error,
        max_error,
        matched_with_clock: errors.len(),
    })
}

/// Relative ordering agreement of matched pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceMetrics {
    /// Fraction of pair-of-pairs whose predicted order agrees with ground truth
    pub pairs_in_order: f64,
    /// Number of pair-of-pairs compared
    pub total_pairs: usize,
    /// Pair-of-pairs whose predicted order is reversed
    pub inversions: usize,
}

/// Count order inversions among matched pairs
///
/// `matched` holds `(gt_index, pred_index)` tuples in any order. With fewer
/// than two pairs there is nothing to compare and `pairs_in_order` is 1.0.
pub fn calculate_sequence_metrics(matched: &[(usize, usize)]) -> SequenceMetrics {
    let mut sorted = matched.to_vec();
    sorted.sort_unstable();

    let mut inversions = 0;
    let mut total_pairs = 0;
    for (i, &(_, earlier)) in sorted.iter().enumerate() {
        for &(_, later) in &sorted[i + 1..] {
            total_pairs += 1;
            if earlier > later {
                inversions += 1;
            }
        }
    }

    let pairs_in_order = if total_pairs > 0 {
        (total_pairs - inversions) as f64 / total_pairs as f64
    } else {
        1.0
    };

    SequenceMetrics {
        pairs_in_order,
        total_pairs,
        inversions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Athlete, Totals};

    #[test]
    fn test_perfect_accuracy() {
        let metrics = DetectionMetrics::from_counts(3, 0, 0);

        assert_eq!(metrics.true_positives, 3);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 1.0);
    }

    #[test]
    fn test_no_predictions() {
        let metrics = DetectionMetrics::from_counts(0, 0, 3);

        assert_eq!(metrics.false_negatives, 3);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1_score, 0.0);
    }

    #[test]
    fn test_no_ground_truth() {
        let metrics = DetectionMetrics::from_counts(0, 2, 0);

        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 0.0);
    }

    #[test]
    fn test_both_empty() {
        let metrics = DetectionMetrics::from_counts(0, 0, 0);

        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 1.0);
    }

    #[test]
    fn test_partial_match() {
        let metrics = DetectionMetrics::from_counts(1, 2, 2);

        assert!((metrics.precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((metrics.recall - 1.0 / 3.0).abs() < 1e-12);
        assert!((metrics.f1_score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_field_agreement() {
        let g = Event::new(10.0, Athlete::A)
            .with_points(2)
            .with_running_score(Totals::new(2, 0));
        let p = Event::new(11.0, Athlete::A)
            .with_points(3)
            .with_running_score(Totals::new(2, 0));

        let agreement = FieldAgreement::compare(&g, &p);
        assert!(!agreement.points_change);
        assert!(agreement.advantages_change);
        assert!(agreement.running_score);
        // Both absent counts as agreement
        assert!(agreement.running_penalties);
        assert!(!agreement.all());
    }

    #[test]
    fn test_field_accuracy_without_pairs_is_undefined() {
        let table = calculate_field_accuracy(&[] as &[FieldAgreement]);

        assert_eq!(table.len(), ScoredField::ALL.len());
        for accuracy in table.values() {
            assert_eq!(accuracy.total, 0);
            assert_eq!(accuracy.accuracy, None);
        }
    }

    #[test]
    fn test_field_accuracy_counts() {
        let all = FieldAgreement {
            points_change: true,
            advantages_change: true,
            penalties_change: true,
            running_score: true,
            running_advantages: true,
            running_penalties: true,
        };
        let wrong_points = FieldAgreement {
            points_change: false,
            ..all
        };

        let table = calculate_field_accuracy(&[all, wrong_points]);
        let points = table[&ScoredField::PointsChange];
        assert_eq!((points.correct, points.total), (1, 2));
        assert_eq!(points.accuracy, Some(0.5));
        assert_eq!(table[&ScoredField::RunningScore].accuracy, Some(1.0));
    }

    #[test]
    fn test_clock_accuracy() {
        let g1 = Event::new(10.0, Athlete::A).with_clock("9:50");
        let p1 = Event::new(11.0, Athlete::A).with_clock("9:47");
        let g2 = Event::new(20.0, Athlete::B).with_clock("9:40");
        let p2 = Event::new(20.0, Athlete::B).with_clock("9:41");
        let g3 = Event::new(30.0, Athlete::B).with_clock("9:30");
        let p3 = Event::new(30.0, Athlete::B);

        let clock = calculate_clock_accuracy([(&g1, &p1), (&g2, &p2), (&g3, &p3)]).unwrap();
        assert_eq!(clock.matched_with_clock, 2);
        assert_eq!(clock.min_error, 1);
        assert_eq!(clock.max_error, 3);
        assert_eq!(clock.mean_absolute_error, 2.0);

        assert_eq!(calculate_clock_accuracy([(&g3, &p3)]), None);
    }

    #[test]
    fn test_sequence_metrics() {
        let in_order = calculate_sequence_metrics(&[(0, 0), (1, 1), (2, 2)]);
        assert_eq!(in_order.total_pairs, 3);
        assert_eq!(in_order.inversions, 0);
        assert_eq!(in_order.pairs_in_order, 1.0);

        let swapped = calculate_sequence_metrics(&[(1, 0), (0, 1)]);
        assert_eq!(swapped.total_pairs, 1);
        assert_eq!(swapped.inversions, 1);
        assert_eq!(swapped.pairs_in_order, 0.0);

        let single = calculate_sequence_metrics(&[(4, 2)]);
        assert_eq!(single.total_pairs, 0);
        assert_eq!(single.pairs_in_order, 1.0);
    }
}
