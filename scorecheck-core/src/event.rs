//! Normalized event model
//!
//! An [`Event`] is one scoring change on the scoreboard. Events are produced by
//! the [`normalize`](crate::normalize) module and are never mutated afterwards.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static TOTALS_PATTERN: OnceLock<Regex> = OnceLock::new();
static CLOCK_PATTERN: OnceLock<Regex> = OnceLock::new();

fn totals_pattern() -> &'static Regex {
    // "2-4", "2 - 4", "2-4 (3 adv)"
    TOTALS_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s*-\s*(\d+)\s*(?:\(.*\))?\s*$")
            .expect("Failed to compile totals pattern")
    })
}

fn clock_pattern() -> &'static Regex {
    CLOCK_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?:(\d+):(\d{1,2})|(\d+))\s*$")
            .expect("Failed to compile clock pattern")
    })
}

/// Scoreboard side an event is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Athlete {
    /// Left side of the scoreboard (athlete 1)
    A,
    /// Right side of the scoreboard (athlete 2)
    B,
}

impl Athlete {
    /// Both sides in scoreboard order
    pub const ALL: [Athlete; 2] = [Athlete::A, Athlete::B];

    /// Parse a side identifier: `A`/`B` or `1`/`2`, case-insensitive
    pub fn parse_id(value: &str) -> Option<Self> {
        match value.trim() {
            "A" | "a" | "1" => Some(Athlete::A),
            "B" | "b" | "2" => Some(Athlete::B),
            _ => None,
        }
    }

    /// Map the 1-based athlete number used by annotation tools
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(Athlete::A),
            2 => Some(Athlete::B),
            _ => None,
        }
    }

    /// Short label
    pub fn as_str(&self) -> &'static str {
        match self {
            Athlete::A => "A",
            Athlete::B => "B",
        }
    }

    /// 1-based athlete number
    pub fn number(&self) -> u8 {
        match self {
            Athlete::A => 1,
            Athlete::B => 2,
        }
    }
}

impl fmt::Display for Athlete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Athlete {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Athlete::parse_id(s).ok_or_else(|| ValidationError::UnknownAthlete {
            value: format!("{s:?}"),
        })
    }
}

/// Cumulative counts for both athletes, in scoreboard order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Totals(pub u32, pub u32);

impl Totals {
    /// Create totals from per-athlete counts
    pub fn new(athlete_a: u32, athlete_b: u32) -> Self {
        Self(athlete_a, athlete_b)
    }

    /// Count for one side
    pub fn get(&self, athlete: Athlete) -> u32 {
        match athlete {
            Athlete::A => self.0,
            Athlete::B => self.1,
        }
    }

    /// Parse the `"a-b"` display form, ignoring a parenthesised suffix
    pub fn parse(value: &str) -> Option<Self> {
        let caps = totals_pattern().captures(value)?;
        let a = caps[1].parse().ok()?;
        let b = caps[2].parse().ok()?;
        Some(Self(a, b))
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// Match clock as shown on the broadcast, e.g. `"8:45"`
///
/// The raw text is kept even when it does not parse; it is informational and
/// never takes part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchClock(String);

impl MatchClock {
    /// Wrap a clock display string
    pub fn new(display: impl Into<String>) -> Self {
        Self(display.into())
    }

    /// The display string as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Clock value in seconds for `M:SS` or bare-seconds strings
    pub fn seconds(&self) -> Option<u32> {
        let caps = clock_pattern().captures(&self.0)?;
        match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(minutes), Some(seconds), _) => {
                let minutes: u32 = minutes.as_str().parse().ok()?;
                let seconds: u32 = seconds.as_str().parse().ok()?;
                minutes.checked_mul(60)?.checked_add(seconds)
            }
            (_, _, Some(seconds)) => seconds.as_str().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for MatchClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized scoring event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Video-relative time of the event in seconds
    pub timestamp_seconds: f64,
    /// Match clock display at the time of the event
    pub match_clock: Option<MatchClock>,
    /// Side the scoring change is attributed to
    pub athlete: Athlete,
    /// Points gained (positive) or removed (negative)
    pub points_change: i32,
    /// Advantages gained or removed
    pub advantages_change: i32,
    /// Penalties received or removed
    pub penalties_change: i32,
    /// Free-text description, never scored
    pub action: String,
    /// Rulebook citation, never scored
    pub rule_reference: Option<String>,
    /// Score after this event
    pub running_score: Option<Totals>,
    /// Advantages after this event
    pub running_advantages: Option<Totals>,
    /// Penalties after this event
    pub running_penalties: Option<Totals>,
}

impl Event {
    /// Create an event with zero deltas and no informational fields
    pub fn new(timestamp_seconds: f64, athlete: Athlete) -> Self {
        Self {
            timestamp_seconds,
            match_clock: None,
            athlete,
            points_change: 0,
            advantages_change: 0,
            penalties_change: 0,
            action: String::new(),
            rule_reference: None,
            running_score: None,
            running_advantages: None,
            running_penalties: None,
        }
    }

    /// Set the points delta
    pub fn with_points(mut self, points_change: i32) -> Self {
        self.points_change = points_change;
        self
    }

    /// Set the advantages delta
    pub fn with_advantages(mut self, advantages_change: i32) -> Self {
        self.advantages_change = advantages_change;
        self
    }

    /// Set the penalties delta
    pub fn with_penalties(mut self, penalties_change: i32) -> Self {
        self.penalties_change = penalties_change;
        self
    }

    /// Set the running score
    pub fn with_running_score(mut self, totals: Totals) -> Self {
        self.running_score = Some(totals);
        self
    }

    /// Set the running advantages
    pub fn with_running_advantages(mut self, totals: Totals) -> Self {
        self.running_advantages = Some(totals);
        self
    }

    /// Set the running penalties
    pub fn with_running_penalties(mut self, totals: Totals) -> Self {
        self.running_penalties = Some(totals);
        self
    }

    /// Set the match clock display
    pub fn with_clock(mut self, clock: impl Into<String>) -> Self {
        self.match_clock = Some(MatchClock::new(clock));
        self
    }

    /// Set the action description
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }
}
