//! Markdown output formatter

use super::{
    athlete_label, check, clock_label, details, optional_percent, percent, skipped_records,
    Detail, ReportFormatter, SummaryRow,
};
use anyhow::Result;
use scorecheck_core::Evaluation;
use std::io::{self, Write};

/// Markdown formatter - outputs each evaluation as a section of tables
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    show_details: bool,
    rows: Vec<SummaryRow>,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W, show_details: bool) -> Self {
        Self {
            writer,
            show_details,
            rows: Vec::new(),
        }
    }

    fn write_section(&mut self, source: &str, evaluation: &Evaluation) -> io::Result<()> {
        let w = &mut self.writer;
        let result = &evaluation.result;
        let detection = &result.detection;

        writeln!(w, "## {source}")?;
        writeln!(w)?;
        writeln!(
            w,
            "**Model:** {} | **Resolution:** {} | **Tolerance:** {}s ({})",
            evaluation.model,
            evaluation.media_resolution,
            result.tolerance_seconds,
            result.strategy
        )?;
        writeln!(w)?;

        writeln!(w, "| Metric | Value |")?;
        writeln!(w, "|---|---|")?;
        writeln!(
            w,
            "| Events (pred / GT) | {} / {} |",
            evaluation.pred_event_count, evaluation.gt_event_count
        )?;
        writeln!(w, "| True positives | {} |", detection.true_positives)?;
        writeln!(w, "| False negatives | {} |", detection.false_negatives)?;
        writeln!(w, "| False positives | {} |", detection.false_positives)?;
        writeln!(w, "| Precision | {} |", percent(detection.precision))?;
        writeln!(w, "| Recall | {} |", percent(detection.recall))?;
        writeln!(w, "| F1 | {} |", percent(detection.f1_score))?;
        writeln!(
            w,
            "| Pairs in order | {} |",
            percent(result.sequence.pairs_in_order)
        )?;
        if let Some(clock) = &result.clock_accuracy {
            writeln!(
                w,
                "| Clock MAE | {:.1}s ({} events) |",
                clock.mean_absolute_error, clock.matched_with_clock
            )?;
        }
        writeln!(w)?;

        writeln!(w, "| Field | Correct | Total | Accuracy |")?;
        writeln!(w, "|---|---|---|---|")?;
        for (field, accuracy) in &result.field_accuracy {
            writeln!(
                w,
                "| {field} | {} | {} | {} |",
                accuracy.correct,
                accuracy.total,
                optional_percent(accuracy.accuracy)
            )?;
        }
        writeln!(w)?;

        let level = &evaluation.match_level;
        writeln!(
            w,
            "- Final score: {} (GT: {}, Pred: {})",
            check(level.final_score_correct),
            level.gt_final_score,
            level.pred_final_score
        )?;
        writeln!(
            w,
            "- Winner: {} (GT: {}, Pred: {})",
            check(level.winner_correct),
            level.gt_winner,
            level.pred_winner
        )?;
        writeln!(w)?;

        let mut header_written = false;
        for (side, record) in skipped_records(evaluation) {
            if !header_written {
                writeln!(w, "**Skipped records:**")?;
                writeln!(w)?;
                header_written = true;
            }
            writeln!(w, "- {side}[{}]: {}", record.index, record.error)?;
        }
        if header_written {
            writeln!(w)?;
        }

        if self.show_details {
            writeln!(w, "| | GT | Pred | Athlete | Clock | Action |")?;
            writeln!(w, "|---|---|---|---|---|---|")?;
            for detail in details(evaluation) {
                match detail {
                    Detail::Matched {
                        gt_index,
                        pred_index,
                        ground_truth,
                        predicted,
                    } => writeln!(
                        w,
                        "| ✓ | {gt_index} | {pred_index} | {} | {} → {} | {} |",
                        athlete_label(evaluation, ground_truth.athlete),
                        clock_label(ground_truth),
                        clock_label(predicted),
                        escape(&ground_truth.action)
                    )?,
                    Detail::Missed { index, event } => writeln!(
                        w,
                        "| missed | {index} | | {} | {} | {} |",
                        athlete_label(evaluation, event.athlete),
                        clock_label(event),
                        escape(&event.action)
                    )?,
                    Detail::Extra { index, event } => writeln!(
                        w,
                        "| extra | | {index} | {} | {} | {} |",
                        athlete_label(evaluation, event.athlete),
                        clock_label(event),
                        escape(&event.action)
                    )?,
                }
            }
            writeln!(w)?;
        }

        Ok(())
    }

    fn write_summary(&mut self) -> io::Result<()> {
        let w = &mut self.writer;

        writeln!(w, "## Summary")?;
        writeln!(w)?;
        writeln!(w, "| Result | Model | Res | F1 | Precision | Recall |")?;
        writeln!(w, "|---|---|---|---|---|---|")?;
        for row in &self.rows {
            writeln!(
                w,
                "| {} | {} | {} | {} | {} | {} |",
                row.source,
                row.model,
                row.resolution,
                percent(row.f1),
                percent(row.precision),
                percent(row.recall)
            )?;
        }
        writeln!(w)?;
        Ok(())
    }
}

/// Keep free text from breaking table cells
fn escape(text: &str) -> String {
    text.replace('|', "\\|")
}

impl<W: Write + Send + Sync> ReportFormatter for MarkdownFormatter<W> {
    fn format_evaluation(&mut self, source: &str, evaluation: &Evaluation) -> Result<()> {
        self.write_section(source, evaluation)?;
        self.rows.push(SummaryRow::new(source, evaluation));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.rows.len() > 1 {
            self.write_summary()?;
        }
        writeln!(self.writer, "---")?;
        writeln!(
            self.writer,
            "*Evaluated result files: {}*",
            self.rows.len()
        )?;
        self.writer.flush()?;
        Ok(())
    }
}
