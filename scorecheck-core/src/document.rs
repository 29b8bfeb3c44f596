//! Ground-truth and analysis-run documents
//!
//! Both documents describe a whole match: the athletes, the final outcome, and
//! the scoring events. Events stay as raw JSON here and are only turned into
//! [`Event`](crate::Event)s by the normalizer during evaluation.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A match analysis: athletes, outcome and raw events
///
/// Used both for human ground truth and for the analysis section of a model
/// run. Missing fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchAnalysis {
    /// Full name of the athlete on side A
    pub athlete_1_name: String,
    /// Full name of the athlete on side B
    pub athlete_2_name: String,
    /// Final score, e.g. `"4-16"`
    pub final_score: String,
    /// Name of the winner
    pub winner: String,
    /// Raw event records
    pub events: Vec<Value>,
}

/// Human-annotated reference for one match
pub type GroundTruthDocument = MatchAnalysis;

impl MatchAnalysis {
    /// Parse a document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Output of one model run over a match video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Model identifier
    #[serde(default = "unknown")]
    pub model: String,
    /// Media resolution setting used for the run
    #[serde(default = "unknown")]
    pub media_resolution: String,
    /// The analysis itself
    #[serde(default)]
    pub analysis: MatchAnalysis,
}

fn unknown() -> String {
    "unknown".to_string()
}

impl AnalysisRun {
    /// Wrap a bare analysis
    pub fn from_analysis(analysis: MatchAnalysis) -> Self {
        Self {
            model: unknown(),
            media_resolution: unknown(),
            analysis,
        }
    }

    /// Parse a run from JSON text
    ///
    /// Accepts either a full run (`{"model": .., "analysis": {..}}`) or a bare
    /// analysis object with `events` at the top level.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let wrapped = value.get("analysis").is_some_and(Value::is_object);

        if wrapped {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Self::from_analysis(serde_json::from_value(value)?))
        }
    }
}

/// Agreement on whole-match facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchLevelMetrics {
    /// Final score strings are identical
    pub final_score_correct: bool,
    /// Ground-truth final score
    pub gt_final_score: String,
    /// Predicted final score
    pub pred_final_score: String,
    /// Winner names are identical
    pub winner_correct: bool,
    /// Ground-truth winner
    pub gt_winner: String,
    /// Predicted winner
    pub pred_winner: String,
    /// Athlete A's name is identical
    pub athlete_1_name_correct: bool,
    /// Athlete B's name is identical
    pub athlete_2_name_correct: bool,
}

impl MatchLevelMetrics {
    /// Compare two analyses
    pub fn compare(ground_truth: &MatchAnalysis, predicted: &MatchAnalysis) -> Self {
        Self {
            final_score_correct: ground_truth.final_score == predicted.final_score,
            gt_final_score: ground_truth.final_score.clone(),
            pred_final_score: predicted.final_score.clone(),
            winner_correct: ground_truth.winner == predicted.winner,
            gt_winner: ground_truth.winner.clone(),
            pred_winner: predicted.winner.clone(),
            athlete_1_name_correct: ground_truth.athlete_1_name == predicted.athlete_1_name,
            athlete_2_name_correct: ground_truth.athlete_2_name == predicted.athlete_2_name,
        }
    }
}
