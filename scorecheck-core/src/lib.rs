//! Timeline matching and accuracy scoring for match scoring events
//!
//! A scoring-event extractor watches a match video and emits a timeline of
//! events: who scored, when, and what the scoreboard showed afterwards. This
//! crate measures such a timeline against a human-annotated ground truth.
//!
//! # Pipeline
//!
//! 1. **Normalize**: loosely-typed JSON records become [`Event`]s through the
//!    [`Normalizer`]. Malformed records are rejected, never coerced.
//! 2. **Match**: the [`Matcher`] pairs predicted events with ground-truth
//!    events that lie within a timestamp tolerance and credit the same
//!    athlete. Each event is used at most once.
//! 3. **Score**: precision, recall and F1 from the pair counts, plus per-field
//!    accuracy over the matched pairs.
//!
//! # Example
//!
//! ```rust
//! use scorecheck_core::{match_events, normalize_events, DEFAULT_TOLERANCE_SECONDS};
//! use serde_json::json;
//!
//! let ground_truth = normalize_events(&[
//!     json!({"timestamp_seconds": 100, "athlete": "B", "points_change": 2,
//!            "running_score": "0-2"}),
//! ])
//! .unwrap();
//! let predicted = normalize_events(&[
//!     json!({"timestamp_seconds": 103, "athlete": "B", "points_change": 3,
//!            "running_score": "0-3"}),
//! ])
//! .unwrap();
//!
//! let result = match_events(&ground_truth, &predicted, DEFAULT_TOLERANCE_SECONDS).unwrap();
//!
//! assert_eq!(result.matched_count(), 1);
//! assert_eq!(result.f1_score(), 1.0);
//! assert_eq!(
//!     result.field_accuracy(scorecheck_core::ScoredField::PointsChange),
//!     Some(0.0)
//! );
//! ```

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod evaluation;
pub mod event;
pub mod matcher;
pub mod metrics;
pub mod normalize;
pub mod report;

pub use batch::{evaluate_batch, BatchJob};
pub use config::{EvalConfig, EvalConfigBuilder};
pub use document::{AnalysisRun, GroundTruthDocument, MatchAnalysis, MatchLevelMetrics};
pub use error::{Error, Result, ValidationError};
pub use evaluation::{evaluate_documents, Evaluation};
pub use event::{Athlete, Event, MatchClock, Totals};
pub use matcher::{
    candidates, Alignment, AssignmentStrategy, Candidate, GreedyNearest, GroundTruthOrder, Matcher,
    MaxCardinality, Side, StrategyKind, DEFAULT_TOLERANCE_SECONDS,
};
pub use metrics::{
    calculate_clock_accuracy, calculate_field_accuracy, calculate_sequence_metrics, ClockAccuracy,
    DetectionMetrics, FieldAccuracy, FieldAgreement, ScoredField, SequenceMetrics,
};
pub use normalize::{
    normalize_event, normalize_events, normalize_events_lenient, LenientBatch, Normalizer,
    RejectedRecord, Roster,
};
pub use report::{match_events, MatchPair, MatchResult};
