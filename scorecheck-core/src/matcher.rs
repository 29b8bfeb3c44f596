//! Timeline alignment
//!
//! A ground-truth event `g` and a predicted event `p` form a *candidate pair*
//! when `|g.t - p.t| <= tolerance` and both name the same athlete. Candidates
//! are enumerated over the full cross product and ordered by distance, then
//! ground-truth index, then predicted index. An [`AssignmentStrategy`] turns
//! that ordered list into a one-to-one alignment.
//!
//! The default [`GreedyNearest`] strategy walks the ordered candidates and
//! commits every pair whose two indices are still free. It is not globally
//! optimal when tolerance windows overlap; [`MaxCardinality`] repairs that
//! with augmenting paths while keeping the same deterministic ordering.

use crate::error::{Error, Result};
use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Default timestamp tolerance in seconds
pub const DEFAULT_TOLERANCE_SECONDS: f64 = 5.0;

/// An eligible (ground truth, prediction) pairing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index into the ground-truth sequence
    pub gt_index: usize,
    /// Index into the predicted sequence
    pub pred_index: usize,
    /// Absolute timestamp difference in seconds
    pub distance_seconds: f64,
}

impl Candidate {
    /// Canonical candidate order: distance, then gt index, then pred index
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.distance_seconds
            .total_cmp(&other.distance_seconds)
            .then(self.gt_index.cmp(&other.gt_index))
            .then(self.pred_index.cmp(&other.pred_index))
    }
}

/// Enumerate all candidate pairs in canonical order
pub fn candidates(
    ground_truth: &[Event],
    predicted: &[Event],
    tolerance_seconds: f64,
) -> Vec<Candidate> {
    let mut found = Vec::new();

    for (gt_index, g) in ground_truth.iter().enumerate() {
        for (pred_index, p) in predicted.iter().enumerate() {
            if g.athlete != p.athlete {
                continue;
            }
            let distance_seconds = (g.timestamp_seconds - p.timestamp_seconds).abs();
            if distance_seconds <= tolerance_seconds {
                found.push(Candidate {
                    gt_index,
                    pred_index,
                    distance_seconds,
                });
            }
        }
    }

    found.sort_by(Candidate::canonical_cmp);
    found
}

/// Turns ordered candidates into a one-to-one assignment
pub trait AssignmentStrategy: Send + Sync {
    /// Select committed pairs from `candidates`, which is in canonical order
    ///
    /// Implementations must never use an index twice and must be
    /// deterministic for identical input.
    fn assign(&self, gt_len: usize, pred_len: usize, candidates: &[Candidate]) -> Vec<Candidate>;

    /// Strategy name for logs and reports
    fn name(&self) -> &'static str;
}

/// Commit candidates in ascending distance order while both indices are free
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyNearest;

impl AssignmentStrategy for GreedyNearest {
    fn assign(&self, gt_len: usize, pred_len: usize, candidates: &[Candidate]) -> Vec<Candidate> {
        let mut gt_used = vec![false; gt_len];
        let mut pred_used = vec![false; pred_len];
        let mut committed = Vec::new();

        for candidate in candidates {
            if gt_used[candidate.gt_index] || pred_used[candidate.pred_index] {
                continue;
            }
            gt_used[candidate.gt_index] = true;
            pred_used[candidate.pred_index] = true;
            committed.push(*candidate);
        }

        committed
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}

/// Walk ground-truth events in order, each taking its nearest free prediction
///
/// Earlier ground-truth events get first pick even when a later one is closer
/// to the same prediction. Equidistant predictions resolve to the lowest index.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundTruthOrder;

impl AssignmentStrategy for GroundTruthOrder {
    fn assign(&self, gt_len: usize, pred_len: usize, candidates: &[Candidate]) -> Vec<Candidate> {
        let by_gt = group_by_gt(gt_len, candidates);
        let mut pred_used = vec![false; pred_len];
        let mut committed = Vec::new();

        for options in &by_gt {
            if let Some(choice) = options.iter().find(|c| !pred_used[c.pred_index]) {
                pred_used[choice.pred_index] = true;
                committed.push(*choice);
            }
        }

        committed
    }

    fn name(&self) -> &'static str {
        "gt-order"
    }
}

/// Maximum-cardinality assignment seeded with the greedy result
///
/// Starting from [`GreedyNearest`], every unmatched ground-truth event (in
/// index order) searches for an augmenting path, visiting its candidates in
/// canonical order. Each successful search adds one pair, so the result is a
/// maximum matching that only departs from the greedy one where that gains a
/// match.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCardinality;

impl AssignmentStrategy for MaxCardinality {
    fn assign(&self, gt_len: usize, pred_len: usize, candidates: &[Candidate]) -> Vec<Candidate> {
        let by_gt = group_by_gt(gt_len, candidates);

        // pred index -> candidate currently holding it
        let mut owner: Vec<Option<Candidate>> = vec![None; pred_len];
        let mut gt_matched = vec![false; gt_len];
        for c in GreedyNearest.assign(gt_len, pred_len, candidates) {
            owner[c.pred_index] = Some(c);
            gt_matched[c.gt_index] = true;
        }

        for gt_index in 0..gt_len {
            if gt_matched[gt_index] {
                continue;
            }
            let mut visited = vec![false; pred_len];
            augment(gt_index, &by_gt, &mut owner, &mut visited);
        }

        let mut committed: Vec<Candidate> = owner.into_iter().flatten().collect();
        committed.sort_by_key(|c| c.gt_index);
        committed
    }

    fn name(&self) -> &'static str {
        "max-cardinality"
    }
}

/// Kuhn's augmenting-path step
fn augment(
    gt_index: usize,
    by_gt: &[Vec<Candidate>],
    owner: &mut [Option<Candidate>],
    visited: &mut [bool],
) -> bool {
    for candidate in &by_gt[gt_index] {
        let pred = candidate.pred_index;
        if visited[pred] {
            continue;
        }
        visited[pred] = true;

        let current = owner[pred];
        let free = match current {
            None => true,
            Some(holder) => augment(holder.gt_index, by_gt, owner, visited),
        };
        if free {
            owner[pred] = Some(*candidate);
            return true;
        }
    }
    false
}

/// Per-gt candidate lists, each keeping canonical order
fn group_by_gt(gt_len: usize, candidates: &[Candidate]) -> Vec<Vec<Candidate>> {
    let mut by_gt = vec![Vec::new(); gt_len];
    for candidate in candidates {
        by_gt[candidate.gt_index].push(*candidate);
    }
    by_gt
}

/// Selectable assignment strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// [`GreedyNearest`]
    #[default]
    Greedy,
    /// [`GroundTruthOrder`]
    GtOrder,
    /// [`MaxCardinality`]
    MaxCardinality,
}

impl StrategyKind {
    /// All strategies
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Greedy,
        StrategyKind::GtOrder,
        StrategyKind::MaxCardinality,
    ];

    /// The strategy implementation
    pub fn strategy(&self) -> &'static dyn AssignmentStrategy {
        match self {
            StrategyKind::Greedy => &GreedyNearest,
            StrategyKind::GtOrder => &GroundTruthOrder,
            StrategyKind::MaxCardinality => &MaxCardinality,
        }
    }

    /// Strategy name
    pub fn as_str(&self) -> &'static str {
        self.strategy().name()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("unknown matching strategy '{s}'")))
    }
}

/// Which side of the evaluation a sequence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Human-annotated reference
    GroundTruth,
    /// Machine-generated sequence under evaluation
    Predicted,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::GroundTruth => f.write_str("ground-truth"),
            Side::Predicted => f.write_str("predicted"),
        }
    }
}

/// Committed pairs plus unmatched indices on both sides
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Committed pairs, ordered by ground-truth index
    pub pairs: Vec<Candidate>,
    /// Unmatched ground-truth indices, ascending
    pub misses: Vec<usize>,
    /// Unmatched predicted indices, ascending
    pub false_positives: Vec<usize>,
}

/// Aligns a predicted sequence to ground truth
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    tolerance_seconds: f64,
    strategy: StrategyKind,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            strategy: StrategyKind::default(),
        }
    }
}

impl Matcher {
    /// Create a greedy matcher with the given tolerance
    pub fn new(tolerance_seconds: f64) -> Result<Self> {
        validate_tolerance(tolerance_seconds)?;
        Ok(Self {
            tolerance_seconds,
            strategy: StrategyKind::default(),
        })
    }

    /// Use a different assignment strategy
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Tolerance window in seconds
    pub fn tolerance_seconds(&self) -> f64 {
        self.tolerance_seconds
    }

    /// Assignment strategy in use
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Align `predicted` to `ground_truth`
    pub fn align(&self, ground_truth: &[Event], predicted: &[Event]) -> Result<Alignment> {
        validate_sequence(ground_truth, Side::GroundTruth)?;
        validate_sequence(predicted, Side::Predicted)?;

        let candidates = candidates(ground_truth, predicted, self.tolerance_seconds);
        let strategy = self.strategy.strategy();
        tracing::debug!(
            ground_truth = ground_truth.len(),
            predicted = predicted.len(),
            candidates = candidates.len(),
            strategy = strategy.name(),
            "enumerated candidate pairs"
        );

        let mut pairs = strategy.assign(ground_truth.len(), predicted.len(), &candidates);
        pairs.sort_by_key(|c| c.gt_index);

        let mut gt_used = vec![false; ground_truth.len()];
        let mut pred_used = vec![false; predicted.len()];
        for pair in &pairs {
            gt_used[pair.gt_index] = true;
            pred_used[pair.pred_index] = true;
        }

        Ok(Alignment {
            pairs,
            misses: unused(&gt_used),
            false_positives: unused(&pred_used),
        })
    }
}

fn unused(used: &[bool]) -> Vec<usize> {
    used.iter()
        .enumerate()
        .filter_map(|(i, &u)| (!u).then_some(i))
        .collect()
}

pub(crate) fn validate_tolerance(tolerance_seconds: f64) -> Result<()> {
    if !tolerance_seconds.is_finite() || tolerance_seconds < 0.0 {
        return Err(Error::invalid_input(format!(
            "tolerance_seconds must be a finite non-negative number, got {tolerance_seconds}"
        )));
    }
    Ok(())
}

/// Re-check the parts of the event contract the type system does not enforce
///
/// `Athlete` cannot hold an unknown identifier, but timestamps are plain
/// public floats and may have been built without the normalizer.
fn validate_sequence(events: &[Event], side: Side) -> Result<()> {
    for (index, event) in events.iter().enumerate() {
        let t = event.timestamp_seconds;
        if !t.is_finite() || t < 0.0 {
            return Err(Error::invalid_input(format!(
                "{side} event {index} has invalid timestamp_seconds {t}"
            )));
        }
    }
    Ok(())
}
