//! Event normalization
//!
//! Raw event records arrive as loosely-typed JSON: from a human annotation
//! tool and from the structured response of an analysis model. Every record
//! passes through [`Normalizer::normalize`] before it reaches the matcher.
//! There is no implicit coercion: a string where a number belongs is an
//! error, not a number.
//!
//! Field rules:
//! - `timestamp_seconds` is required, numeric, finite and non-negative.
//! - `athlete` is required and must name a scoreboard side (`A`/`B`, `1`/`2`,
//!   or a roster name when a [`Roster`] is configured).
//! - `points_change`, `advantages_change`, `penalties_change` default to 0 and
//!   must be integers when present.
//! - `running_score`, `running_advantages`, `running_penalties` are optional
//!   and accept `[a, b]` or `"a-b"`.
//! - `match_clock`, `action`, `rule_reference` are informational; their
//!   absence or odd shape is never an error.

use crate::error::ValidationError;
use crate::event::{Athlete, Event, MatchClock, Totals};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Athlete names used to resolve name-valued `athlete` fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Roster {
    athlete_a: String,
    athlete_b: String,
}

impl Roster {
    /// Create a roster from the two athletes' full names
    pub fn new(athlete_a: impl Into<String>, athlete_b: impl Into<String>) -> Self {
        Self {
            athlete_a: athlete_a.into().trim().to_string(),
            athlete_b: athlete_b.into().trim().to_string(),
        }
    }

    /// Whether either name is known
    pub fn is_empty(&self) -> bool {
        self.athlete_a.is_empty() && self.athlete_b.is_empty()
    }

    /// Name of one side
    pub fn name(&self, athlete: Athlete) -> &str {
        match athlete {
            Athlete::A => &self.athlete_a,
            Athlete::B => &self.athlete_b,
        }
    }

    /// Resolve a name to a side
    ///
    /// An exact (case-insensitive) full-name match wins. Otherwise the value
    /// must contain the first name of exactly one athlete.
    pub fn resolve(&self, value: &str) -> Option<Athlete> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        for athlete in Athlete::ALL {
            let name = self.name(athlete);
            if !name.is_empty() && name.eq_ignore_ascii_case(value) {
                return Some(athlete);
            }
        }

        let lowered = value.to_lowercase();
        let mut found = Athlete::ALL.into_iter().filter(|&athlete| {
            self.name(athlete)
                .split_whitespace()
                .next()
                .is_some_and(|first| lowered.contains(&first.to_lowercase()))
        });

        match (found.next(), found.next()) {
            (Some(athlete), None) => Some(athlete),
            _ => None,
        }
    }
}

/// Converts raw records into [`Event`]s
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    roster: Option<Roster>,
}

/// Result of lenient sequence normalization
#[derive(Debug, Clone, Default)]
pub struct LenientBatch {
    /// Records that normalized successfully, in input order
    pub events: Vec<Event>,
    /// Input position of each entry in `events`
    pub source_indices: Vec<usize>,
    /// Records that were skipped
    pub rejected: Vec<RejectedRecord>,
}

/// A record skipped by lenient normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    /// Position in the input sequence
    pub index: usize,
    /// Why it was rejected, serialized as its message
    #[serde(rename = "reason", serialize_with = "serialize_display")]
    pub error: ValidationError,
}

fn serialize_display<S>(error: &ValidationError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(error)
}

impl Normalizer {
    /// Normalizer accepting only side identifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer that also resolves athlete names
    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster: Some(roster).filter(|r| !r.is_empty()),
        }
    }

    /// The configured roster, if any
    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    /// Normalize one raw record
    pub fn normalize(&self, raw: &Value) -> Result<Event, ValidationError> {
        let record = raw.as_object().ok_or(ValidationError::NotAnObject {
            found: json_kind(raw),
        })?;

        Ok(Event {
            timestamp_seconds: timestamp(record)?,
            match_clock: match_clock(record),
            athlete: self.athlete(record)?,
            points_change: integer_field(record, "points_change")?,
            advantages_change: integer_field(record, "advantages_change")?,
            penalties_change: integer_field(record, "penalties_change")?,
            action: text_field(record, "action").unwrap_or_default(),
            rule_reference: text_field(record, "rule_reference")
                .or_else(|| text_field(record, "ibjjf_rule")),
            running_score: totals_field(record, "running_score")?,
            running_advantages: totals_field(record, "running_advantages")?,
            running_penalties: totals_field(record, "running_penalties")?,
        })
    }

    /// Normalize a sequence, failing on the first invalid record
    pub fn normalize_all(&self, raws: &[Value]) -> Result<Vec<Event>, ValidationError> {
        raws.iter()
            .enumerate()
            .map(|(index, raw)| self.normalize(raw).map_err(|e| e.at(index)))
            .collect()
    }

    /// Normalize a sequence, skipping invalid records
    pub fn normalize_lenient(&self, raws: &[Value]) -> LenientBatch {
        let mut batch = LenientBatch::default();

        for (index, raw) in raws.iter().enumerate() {
            match self.normalize(raw) {
                Ok(event) => {
                    batch.events.push(event);
                    batch.source_indices.push(index);
                }
                Err(error) => {
                    tracing::warn!(index, %error, "skipping invalid event record");
                    batch.rejected.push(RejectedRecord { index, error });
                }
            }
        }

        batch
    }

    fn athlete(&self, record: &Map<String, Value>) -> Result<Athlete, ValidationError> {
        let value = present(record, "athlete").ok_or(ValidationError::MissingField {
            field: "athlete",
        })?;

        let resolved = match value {
            Value::String(s) => Athlete::parse_id(s)
                .or_else(|| self.roster.as_ref().and_then(|roster| roster.resolve(s))),
            Value::Number(n) => n.as_i64().and_then(Athlete::from_number),
            _ => None,
        };

        resolved.ok_or_else(|| ValidationError::UnknownAthlete {
            value: value.to_string(),
        })
    }
}

/// Normalize one record with the default normalizer
pub fn normalize_event(raw: &Value) -> Result<Event, ValidationError> {
    Normalizer::new().normalize(raw)
}

/// Normalize a sequence with the default normalizer
pub fn normalize_events(raws: &[Value]) -> Result<Vec<Event>, ValidationError> {
    Normalizer::new().normalize_all(raws)
}

/// Normalize a sequence with the default normalizer, skipping invalid records
pub fn normalize_events_lenient(raws: &[Value]) -> LenientBatch {
    Normalizer::new().normalize_lenient(raws)
}

/// Field value, treating `null` as absent
fn present<'a>(record: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

fn timestamp(record: &Map<String, Value>) -> Result<f64, ValidationError> {
    let value = present(record, "timestamp_seconds").ok_or(ValidationError::MissingField {
        field: "timestamp_seconds",
    })?;

    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        other => {
            return Err(ValidationError::InvalidTimestamp {
                reason: format!("expected a number, found {}", json_kind(other)),
            })
        }
    }
    .ok_or_else(|| ValidationError::InvalidTimestamp {
        reason: format!("{value} is not representable as seconds"),
    })?;

    if !seconds.is_finite() {
        return Err(ValidationError::InvalidTimestamp {
            reason: format!("{seconds} is not finite"),
        });
    }
    if seconds < 0.0 {
        return Err(ValidationError::InvalidTimestamp {
            reason: format!("{seconds} is negative"),
        });
    }

    Ok(seconds)
}

fn integer_field(record: &Map<String, Value>, field: &'static str) -> Result<i32, ValidationError> {
    let Some(value) = present(record, field) else {
        return Ok(0);
    };

    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ValidationError::NonIntegerField {
            field,
            value: value.to_string(),
        })
}

fn totals_field(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Totals>, ValidationError> {
    let Some(value) = present(record, field) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => Totals::parse(s),
        Value::Array(items) if items.len() == 2 => {
            let count = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
            count(&items[0])
                .zip(count(&items[1]))
                .map(|(a, b)| Totals::new(a, b))
        }
        _ => None,
    };

    parsed.map(Some).ok_or_else(|| ValidationError::InvalidTotals {
        field,
        value: value.to_string(),
    })
}

fn match_clock(record: &Map<String, Value>) -> Option<MatchClock> {
    match present(record, "match_clock")? {
        Value::String(s) if !s.trim().is_empty() => Some(MatchClock::new(s.trim())),
        Value::Number(n) => Some(MatchClock::new(n.to_string())),
        _ => None,
    }
}

fn text_field(record: &Map<String, Value>, field: &str) -> Option<String> {
    match present(record, field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_record_defaults() {
        let event = normalize_event(&json!({"timestamp_seconds": 45, "athlete": "A"})).unwrap();

        assert_eq!(event.timestamp_seconds, 45.0);
        assert_eq!(event.athlete, Athlete::A);
        assert_eq!(event.points_change, 0);
        assert_eq!(event.advantages_change, 0);
        assert_eq!(event.penalties_change, 0);
        assert_eq!(event.action, "");
        assert_eq!(event.match_clock, None);
        assert_eq!(event.rule_reference, None);
        assert_eq!(event.running_score, None);
    }

    #[test]
    fn test_full_record() {
        let event = normalize_event(&json!({
            "timestamp_seconds": 312.5,
            "match_clock": "4:48",
            "athlete": 2,
            "points_change": 3,
            "advantages_change": 0,
            "penalties_change": 0,
            "action": "Guard pass",
            "ibjjf_rule": "Art. 5, Item 10",
            "running_score": "2-3",
            "running_advantages": [1, 0],
            "running_penalties": "0-0"
        }))
        .unwrap();

        assert_eq!(event.athlete, Athlete::B);
        assert_eq!(event.points_change, 3);
        assert_eq!(event.match_clock.as_ref().and_then(|c| c.seconds()), Some(288));
        assert_eq!(event.rule_reference.as_deref(), Some("Art. 5, Item 10"));
        assert_eq!(event.running_score, Some(Totals::new(2, 3)));
        assert_eq!(event.running_advantages, Some(Totals::new(1, 0)));
        assert_eq!(event.running_penalties, Some(Totals::new(0, 0)));
    }

    #[test]
    fn test_timestamp_rules() {
        let missing = normalize_event(&json!({"athlete": "A"})).unwrap_err();
        assert_eq!(
            missing,
            ValidationError::MissingField {
                field: "timestamp_seconds"
            }
        );

        let null = normalize_event(&json!({"timestamp_seconds": null, "athlete": "A"}));
        assert!(matches!(null, Err(ValidationError::MissingField { .. })));

        let negative = normalize_event(&json!({"timestamp_seconds": -1.0, "athlete": "A"}));
        assert!(matches!(negative, Err(ValidationError::InvalidTimestamp { .. })));

        // No coercion from numeric strings
        let text = normalize_event(&json!({"timestamp_seconds": "45", "athlete": "A"}));
        assert!(matches!(text, Err(ValidationError::InvalidTimestamp { .. })));

        let zero = normalize_event(&json!({"timestamp_seconds": 0, "athlete": "B"})).unwrap();
        assert_eq!(zero.timestamp_seconds, 0.0);
    }

    #[test]
    fn test_unknown_athlete() {
        for athlete in [json!("C"), json!(3), json!(true), json!("")] {
            let result = normalize_event(&json!({"timestamp_seconds": 1, "athlete": athlete}));
            assert!(
                matches!(result, Err(ValidationError::UnknownAthlete { .. })),
                "athlete {athlete} should be rejected"
            );
        }

        let missing = normalize_event(&json!({"timestamp_seconds": 1}));
        assert_eq!(
            missing.unwrap_err(),
            ValidationError::MissingField { field: "athlete" }
        );
    }

    #[test]
    fn test_non_integer_deltas() {
        for bad in [json!(2.5), json!("2"), json!(true), json!([2])] {
            let result = normalize_event(&json!({
                "timestamp_seconds": 1,
                "athlete": "A",
                "points_change": bad
            }));
            assert!(matches!(
                result,
                Err(ValidationError::NonIntegerField {
                    field: "points_change",
                    ..
                })
            ));
        }

        let negative = normalize_event(&json!({
            "timestamp_seconds": 1,
            "athlete": "A",
            "penalties_change": -1
        }))
        .unwrap();
        assert_eq!(negative.penalties_change, -1);
    }

    #[test]
    fn test_invalid_totals() {
        for bad in [json!("two-four"), json!([1]), json!([-1, 2]), json!(4)] {
            let result = normalize_event(&json!({
                "timestamp_seconds": 1,
                "athlete": "A",
                "running_score": bad
            }));
            assert!(matches!(
                result,
                Err(ValidationError::InvalidTotals {
                    field: "running_score",
                    ..
                })
            ));
        }

        let empty = normalize_event(&json!({
            "timestamp_seconds": 1,
            "athlete": "A",
            "running_score": ""
        }))
        .unwrap();
        assert_eq!(empty.running_score, None);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            normalize_event(&json!([1, 2])).unwrap_err(),
            ValidationError::NotAnObject { found: "an array" }
        );
    }

    #[test]
    fn test_informational_fields_never_fail() {
        let event = normalize_event(&json!({
            "timestamp_seconds": 10,
            "athlete": "B",
            "match_clock": {"minutes": 3},
            "action": 42,
            "rule_reference": false
        }))
        .unwrap();

        assert_eq!(event.match_clock, None);
        assert_eq!(event.action, "");
        assert_eq!(event.rule_reference, None);
    }

    #[test]
    fn test_roster_resolution() {
        let normalizer = Normalizer::with_roster(Roster::new("Ana Silva", "Bea Costa"));

        let exact = normalizer
            .normalize(&json!({"timestamp_seconds": 1, "athlete": "bea costa"}))
            .unwrap();
        assert_eq!(exact.athlete, Athlete::B);

        let first_name = normalizer
            .normalize(&json!({"timestamp_seconds": 1, "athlete": "Ana S."}))
            .unwrap();
        assert_eq!(first_name.athlete, Athlete::A);

        let unknown = normalizer.normalize(&json!({"timestamp_seconds": 1, "athlete": "Referee"}));
        assert!(matches!(unknown, Err(ValidationError::UnknownAthlete { .. })));
    }

    #[test]
    fn test_roster_ambiguous_first_name() {
        let roster = Roster::new("Ana Silva", "Ana Costa");
        assert_eq!(roster.resolve("Ana"), None);
        assert_eq!(roster.resolve("Ana Costa"), Some(Athlete::B));
    }

    #[test]
    fn test_empty_roster_is_ignored() {
        let normalizer = Normalizer::with_roster(Roster::new("", " "));
        assert!(normalizer.roster().is_none());
    }

    #[test]
    fn test_normalize_all_reports_index() {
        let raws = vec![
            json!({"timestamp_seconds": 1, "athlete": "A"}),
            json!({"timestamp_seconds": 2, "athlete": "Z"}),
        ];

        let err = normalize_events(&raws).unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert!(matches!(err.root(), ValidationError::UnknownAthlete { .. }));
    }

    #[test]
    fn test_normalize_lenient_skips_bad_records() {
        let raws = vec![
            json!({"timestamp_seconds": 1, "athlete": "A"}),
            json!({"timestamp_seconds": -2, "athlete": "A"}),
            json!({"timestamp_seconds": 3, "athlete": "B"}),
        ];

        let batch = normalize_events_lenient(&raws);
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.source_indices, vec![0, 2]);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 1);
        assert!(matches!(
            batch.rejected[0].error,
            ValidationError::InvalidTimestamp { ref reason } if reason.contains("negative")
        ));

        let json = serde_json::to_value(&batch.rejected[0]).unwrap();
        assert_eq!(json["index"], 1);
        assert!(json["reason"]
            .as_str()
            .unwrap()
            .starts_with("invalid timestamp_seconds"));
    }
}
