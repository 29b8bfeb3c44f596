//! Batch evaluation of independent runs

use crate::config::EvalConfig;
use crate::document::{AnalysisRun, GroundTruthDocument};
use crate::error::Result;
use crate::evaluation::{evaluate_documents, Evaluation};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One (ground truth, analysis run) pair to evaluate
#[derive(Debug, Clone, Copy)]
pub struct BatchJob<'a> {
    /// Reference timeline
    pub ground_truth: &'a GroundTruthDocument,
    /// Run scored against it
    pub run: &'a AnalysisRun,
}

impl<'a> BatchJob<'a> {
    /// Pair a ground truth with a run
    pub fn new(ground_truth: &'a GroundTruthDocument, run: &'a AnalysisRun) -> Self {
        Self { ground_truth, run }
    }
}

/// Evaluate every job with the same configuration
///
/// Results are returned in job order. One failing job does not affect the
/// others.
pub fn evaluate_batch(jobs: &[BatchJob<'_>], config: &EvalConfig) -> Vec<Result<Evaluation>> {
    tracing::debug!(jobs = jobs.len(), "evaluating batch");

    #[cfg(feature = "parallel")]
    {
        jobs.par_iter()
            .map(|job| evaluate_documents(job.ground_truth, job.run, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        jobs.iter()
            .map(|job| evaluate_documents(job.ground_truth, job.run, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MatchAnalysis;
    use serde_json::json;

    #[test]
    fn test_batch_preserves_order_and_isolates_failures() {
        let gt = MatchAnalysis {
            events: vec![json!({"timestamp_seconds": 10, "athlete": "A"})],
            ..Default::default()
        };
        let good = AnalysisRun {
            model: "good".into(),
            ..AnalysisRun::from_analysis(gt.clone())
        };
        let bad = AnalysisRun {
            model: "bad".into(),
            ..AnalysisRun::from_analysis(MatchAnalysis {
                events: vec![json!({"athlete": "A"})],
                ..Default::default()
            })
        };
        let empty = AnalysisRun::from_analysis(MatchAnalysis::default());

        let jobs = [
            BatchJob::new(&gt, &good),
            BatchJob::new(&gt, &bad),
            BatchJob::new(&gt, &empty),
        ];
        let results = evaluate_batch(&jobs, &EvalConfig::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().model, "good");
        assert_eq!(results[0].as_ref().unwrap().result.f1_score(), 1.0);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().result.recall(), 0.0);
    }
}
