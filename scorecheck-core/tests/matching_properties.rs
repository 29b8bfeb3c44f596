//! Property-based tests for the matcher invariants.

use proptest::prelude::*;
use scorecheck_core::{Athlete, Event, MatchResult, Matcher, StrategyKind};
use std::collections::HashSet;

fn event_strategy() -> impl Strategy<Value = Event> {
    // Timestamps on a half-second grid so exact ties actually occur
    (0u32..400, prop::bool::ANY, -1i32..4).prop_map(|(half_seconds, side, points)| {
        let athlete = if side { Athlete::A } else { Athlete::B };
        Event::new(f64::from(half_seconds) / 2.0, athlete).with_points(points)
    })
}

fn timeline() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(event_strategy(), 0..25)
}

fn evaluate(gt: &[Event], pred: &[Event], tolerance: f64, strategy: StrategyKind) -> MatchResult {
    Matcher::new(tolerance)
        .unwrap()
        .with_strategy(strategy)
        .evaluate(gt, pred)
        .unwrap()
}

proptest! {

    /// Identical input always gives an identical result.
    #[test]
    fn matching_is_deterministic(
        gt in timeline(),
        pred in timeline(),
        tolerance in 0.0f64..20.0,
    ) {
        for strategy in StrategyKind::ALL {
            let first = evaluate(&gt, &pred, tolerance, strategy);
            let second = evaluate(&gt, &pred, tolerance, strategy);
            prop_assert_eq!(first, second);
        }
    }

    /// No index appears in two pairs, and every pair is eligible.
    #[test]
    fn pairs_are_one_to_one_and_eligible(
        gt in timeline(),
        pred in timeline(),
        tolerance in 0.0f64..20.0,
    ) {
        for strategy in StrategyKind::ALL {
            let result = evaluate(&gt, &pred, tolerance, strategy);
            let mut seen_gt = HashSet::new();
            let mut seen_pred = HashSet::new();

            for pair in &result.pairs {
                prop_assert!(seen_gt.insert(pair.gt_index));
                prop_assert!(seen_pred.insert(pair.pred_index));

                let g = &gt[pair.gt_index];
                let p = &pred[pair.pred_index];
                prop_assert_eq!(g.athlete, p.athlete);
                prop_assert!(pair.distance_seconds <= tolerance);
            }
        }
    }

    /// Matched, missed and false-positive counts partition both sequences.
    #[test]
    fn counts_partition_both_sequences(
        gt in timeline(),
        pred in timeline(),
        tolerance in 0.0f64..20.0,
    ) {
        for strategy in StrategyKind::ALL {
            let result = evaluate(&gt, &pred, tolerance, strategy);
            prop_assert_eq!(result.matched_count() + result.misses.len(), gt.len());
            prop_assert_eq!(result.matched_count() + result.false_positives.len(), pred.len());
            prop_assert_eq!(result.detection.true_positives, result.matched_count());
        }
    }

    /// Widening the window never loses a greedy match.
    #[test]
    fn greedy_matches_grow_with_tolerance(
        gt in timeline(),
        pred in timeline(),
        narrow in 0.0f64..10.0,
        extra in 0.0f64..10.0,
    ) {
        let before = evaluate(&gt, &pred, narrow, StrategyKind::Greedy);
        let after = evaluate(&gt, &pred, narrow + extra, StrategyKind::Greedy);
        prop_assert!(after.matched_count() >= before.matched_count());
    }

    /// The exact solver never matches fewer pairs than the heuristics.
    #[test]
    fn max_cardinality_dominates(
        gt in timeline(),
        pred in timeline(),
        tolerance in 0.0f64..20.0,
    ) {
        let max = evaluate(&gt, &pred, tolerance, StrategyKind::MaxCardinality);
        let greedy = evaluate(&gt, &pred, tolerance, StrategyKind::Greedy);
        let gt_order = evaluate(&gt, &pred, tolerance, StrategyKind::GtOrder);
        prop_assert!(max.matched_count() >= greedy.matched_count());
        prop_assert!(max.matched_count() >= gt_order.matched_count());
    }

    /// Metrics stay within [0, 1] and undefined accuracy only when nothing matched.
    #[test]
    fn metrics_are_bounded(
        gt in timeline(),
        pred in timeline(),
        tolerance in 0.0f64..20.0,
    ) {
        let result = evaluate(&gt, &pred, tolerance, StrategyKind::Greedy);
        for value in [result.precision(), result.recall(), result.f1_score()] {
            prop_assert!((0.0..=1.0).contains(&value));
        }
        for accuracy in result.field_accuracy.values() {
            prop_assert_eq!(accuracy.total, result.matched_count());
            prop_assert_eq!(accuracy.accuracy.is_none(), result.matched_count() == 0);
        }
    }
}
