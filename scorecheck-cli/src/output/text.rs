//! Plain text output formatter

use super::{
    athlete_label, check, clock_label, details, optional_percent, percent, skipped_records,
    Detail, ReportFormatter, SummaryRow,
};
use anyhow::Result;
use scorecheck_core::Evaluation;
use std::io::{self, Write};

const RULE_WIDTH: usize = 70;

/// Plain text formatter - one report per result file, then a comparison table
pub struct TextFormatter<W: Write> {
    writer: W,
    show_details: bool,
    rows: Vec<SummaryRow>,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W, show_details: bool) -> Self {
        Self {
            writer,
            show_details,
            rows: Vec::new(),
        }
    }

    fn write_report(&mut self, source: &str, evaluation: &Evaluation) -> io::Result<()> {
        let w = &mut self.writer;
        let result = &evaluation.result;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(w, "{rule}")?;
        writeln!(w, "EVALUATION REPORT: {source}")?;
        writeln!(
            w,
            "Model: {} | Resolution: {}",
            evaluation.model, evaluation.media_resolution
        )?;
        writeln!(w, "{rule}")?;

        writeln!(w)?;
        writeln!(
            w,
            "Events: {} predicted vs {} ground truth",
            evaluation.pred_event_count, evaluation.gt_event_count
        )?;
        writeln!(
            w,
            "Tolerance: ±{}s ({} matching)",
            result.tolerance_seconds, result.strategy
        )?;

        let detection = &result.detection;
        writeln!(w)?;
        writeln!(w, "--- Event Detection ---")?;
        writeln!(w, "  True Positives:  {}", detection.true_positives)?;
        writeln!(
            w,
            "  False Negatives: {} (missed events)",
            detection.false_negatives
        )?;
        writeln!(
            w,
            "  False Positives: {} (extra events)",
            detection.false_positives
        )?;
        writeln!(w, "  Precision: {}", percent(detection.precision))?;
        writeln!(w, "  Recall:    {}", percent(detection.recall))?;
        writeln!(w, "  F1 Score:  {}", percent(detection.f1_score))?;

        writeln!(w)?;
        writeln!(w, "--- Field Accuracy (matched events only) ---")?;
        for (field, accuracy) in &result.field_accuracy {
            writeln!(
                w,
                "  {field}: {}/{} ({})",
                accuracy.correct,
                accuracy.total,
                optional_percent(accuracy.accuracy)
            )?;
        }

        if let Some(clock) = &result.clock_accuracy {
            writeln!(w)?;
            writeln!(w, "--- Match Clock Accuracy ---")?;
            writeln!(
                w,
                "  Mean Absolute Error: {:.1}s",
                clock.mean_absolute_error
            )?;
            writeln!(w, "  Range: {}s - {}s", clock.min_error, clock.max_error)?;
            writeln!(w, "  Events with clock: {}", clock.matched_with_clock)?;
        }

        let sequence = &result.sequence;
        writeln!(w)?;
        writeln!(w, "--- Sequence Ordering ---")?;
        writeln!(
            w,
            "  Pairs in correct order: {}",
            percent(sequence.pairs_in_order)
        )?;
        writeln!(
            w,
            "  Inversions: {}/{}",
            sequence.inversions, sequence.total_pairs
        )?;

        let level = &evaluation.match_level;
        writeln!(w)?;
        writeln!(w, "--- Match-Level ---")?;
        writeln!(
            w,
            "  Final Score: {} (GT: {}, Pred: {})",
            check(level.final_score_correct),
            level.gt_final_score,
            level.pred_final_score
        )?;
        writeln!(
            w,
            "  Winner: {} (GT: {}, Pred: {})",
            check(level.winner_correct),
            level.gt_winner,
            level.pred_winner
        )?;

        let mut header_written = false;
        for (side, record) in skipped_records(evaluation) {
            if !header_written {
                writeln!(w)?;
                writeln!(w, "--- Skipped Records ---")?;
                header_written = true;
            }
            writeln!(w, "  {side}[{}]: {}", record.index, record.error)?;
        }

        if self.show_details {
            writeln!(w)?;
            writeln!(w, "--- Event Matching Detail ---")?;
            for detail in details(evaluation) {
                match detail {
                    Detail::Matched {
                        gt_index,
                        pred_index,
                        ground_truth,
                        predicted,
                    } => writeln!(
                        w,
                        "  ✓ GT[{gt_index}] ↔ Pred[{pred_index}]: {} @ {} → {} | {}",
                        athlete_label(evaluation, ground_truth.athlete),
                        clock_label(ground_truth),
                        clock_label(predicted),
                        ground_truth.action
                    )?,
                    Detail::Missed { index, event } => writeln!(
                        w,
                        "  ✗ MISSED GT[{index}]: {} @ {} | {}",
                        athlete_label(evaluation, event.athlete),
                        clock_label(event),
                        event.action
                    )?,
                    Detail::Extra { index, event } => writeln!(
                        w,
                        "  ✗ EXTRA Pred[{index}]: {} @ {} | {}",
                        athlete_label(evaluation, event.athlete),
                        clock_label(event),
                        event.action
                    )?,
                }
            }
        }

        writeln!(w)?;
        Ok(())
    }

    fn write_summary(&mut self) -> io::Result<()> {
        let w = &mut self.writer;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(w, "{rule}")?;
        writeln!(w, "SUMMARY COMPARISON")?;
        writeln!(w, "{rule}")?;
        writeln!(
            w,
            "{:<30} {:<10} {:<8} {:<8} {:<8}",
            "Model", "Res", "F1", "Prec", "Recall"
        )?;
        writeln!(w, "{}", "-".repeat(RULE_WIDTH))?;
        for row in &self.rows {
            writeln!(
                w,
                "{:<30} {:<10} {:<8} {:<8} {:<8}",
                row.model,
                row.resolution,
                percent(row.f1),
                percent(row.precision),
                percent(row.recall)
            )?;
        }
        Ok(())
    }
}

impl<W: Write + Send + Sync> ReportFormatter for TextFormatter<W> {
    fn format_evaluation(&mut self, source: &str, evaluation: &Evaluation) -> Result<()> {
        self.write_report(source, evaluation)?;
        self.rows.push(SummaryRow::new(source, evaluation));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.rows.len() > 1 {
            self.write_summary()?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::{lenient_evaluation, sample_evaluation};

    fn render(show_details: bool, copies: usize) -> String {
        render_evaluation(&sample_evaluation(), show_details, copies)
    }

    fn render_evaluation(evaluation: &Evaluation, show_details: bool, copies: usize) -> String {
        let mut formatter = TextFormatter::new(Vec::new(), show_details);
        for i in 0..copies {
            formatter
                .format_evaluation(&format!("run_{i}.json"), evaluation)
                .unwrap();
        }
        formatter.finish().unwrap();
        String::from_utf8(formatter.writer).unwrap()
    }

    #[test]
    fn test_report_sections() {
        let output = render(true, 1);

        assert!(output.contains("EVALUATION REPORT: run_0.json"));
        assert!(output.contains("Model: vision-large | Resolution: MEDIA_RESOLUTION_LOW"));
        assert!(output.contains("Events: 2 predicted vs 2 ground truth"));
        assert!(output.contains("  Precision: 50.0%"));
        assert!(output.contains("  points_change: 0/1 (0.0%)"));
        assert!(output.contains("  Mean Absolute Error: 3.0s"));
        assert!(output.contains("  Final Score: ✗ (GT: 2-3, Pred: 3-0)"));
        assert!(output.contains("  ✓ GT[0] ↔ Pred[0]: Ana @ 9:20 → 9:17 | Takedown"));
        assert!(output.contains("  ✗ MISSED GT[1]: Bea @ 6:40 | Guard pass"));
        assert!(output.contains("  ✗ EXTRA Pred[1]: Bea @ ? | Sweep attempt"));
        assert!(!output.contains("SUMMARY COMPARISON"));
    }

    #[test]
    fn test_skipped_and_matched_records_share_raw_positions() {
        let output = render_evaluation(&lenient_evaluation(), true, 1);

        assert!(output.contains("--- Skipped Records ---"));
        assert!(output.contains(
            "  Pred[0]: invalid timestamp_seconds: expected a number, found a string"
        ));
        assert!(output.contains("  ✓ GT[0] ↔ Pred[1]: Ana @ ? → ? | Takedown"));
        assert!(output.contains("  ✗ EXTRA Pred[2]: Bea @ ? | Sweep"));
        assert!(!output.contains("↔ Pred[0]"));
    }

    #[test]
    fn test_details_can_be_hidden() {
        let output = render(false, 1);
        assert!(!output.contains("Event Matching Detail"));
    }

    #[test]
    fn test_summary_for_multiple_files() {
        let output = render(false, 2);
        assert!(output.contains("SUMMARY COMPARISON"));
        assert!(output.contains("vision-large"));
        assert!(output.contains("LOW"));
    }
}
