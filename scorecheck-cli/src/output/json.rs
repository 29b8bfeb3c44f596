//! JSON output formatter

use super::ReportFormatter;
use anyhow::Result;
use scorecheck_core::Evaluation;
use serde::Serialize;
use std::io::Write;

/// JSON formatter - outputs every evaluation as one JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
    entries: Vec<serde_json::Value>,
}

/// Data structure for JSON output
#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    /// Result file the evaluation came from
    pub result_file: &'a str,
    /// The evaluation itself
    #[serde(flatten)]
    pub evaluation: &'a Evaluation,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            entries: Vec::new(),
        }
    }
}

impl<W: Write + Send + Sync> ReportFormatter for JsonFormatter<W> {
    fn format_evaluation(&mut self, source: &str, evaluation: &Evaluation) -> Result<()> {
        self.entries.push(serde_json::to_value(ReportEntry {
            result_file: source,
            evaluation,
        })?);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.entries)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.entries)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_evaluation;

    #[test]
    fn test_json_array_output() {
        let evaluation = sample_evaluation();
        let mut formatter = JsonFormatter::new(Vec::new(), false);
        formatter
            .format_evaluation("run.json", &evaluation)
            .unwrap();
        formatter.finish().unwrap();

        let output = String::from_utf8(formatter.writer).unwrap();
        assert_eq!(output.lines().count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let entry = &parsed[0];
        assert_eq!(entry["result_file"], "run.json");
        assert_eq!(entry["model"], "vision-large");
        assert_eq!(entry["result"]["detection"]["true_positives"], 1);
        assert_eq!(entry["result"]["misses"], serde_json::json!([1]));
        assert_eq!(entry["match_level"]["winner_correct"], false);
    }

    #[test]
    fn test_empty_output_is_empty_array() {
        let mut formatter = JsonFormatter::new(Vec::new(), true);
        formatter.finish().unwrap();
        assert_eq!(String::from_utf8(formatter.writer).unwrap(), "[]\n");
    }
}
