//! Layered error types
//!
//! `ValidationError` describes a single malformed event record and is raised by
//! the normalizer. `Error` is the crate-level error returned by the matcher and
//! the evaluation pipeline.

use thiserror::Error;

/// Errors raised while normalizing a raw event record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The record is not a JSON object
    #[error("event record must be an object, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead
        found: &'static str,
    },

    /// A required field is absent or null
    #[error("missing required field '{field}'")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
    },

    /// `timestamp_seconds` is present but unusable
    #[error("invalid timestamp_seconds: {reason}")]
    InvalidTimestamp {
        /// Why the timestamp was rejected
        reason: String,
    },

    /// `athlete` does not name either scoreboard side
    #[error("unrecognized athlete identifier {value}")]
    UnknownAthlete {
        /// The offending value, rendered as JSON
        value: String,
    },

    /// A delta field is present but not an integer
    #[error("field '{field}' must be an integer, found {value}")]
    NonIntegerField {
        /// Name of the field
        field: &'static str,
        /// The offending value, rendered as JSON
        value: String,
    },

    /// A running-total field is present but not a pair of counts
    #[error("field '{field}' must be a pair of non-negative integers, found {value}")]
    InvalidTotals {
        /// Name of the field
        field: &'static str,
        /// The offending value, rendered as JSON
        value: String,
    },

    /// Wraps an error with the position of the record in its sequence
    #[error("event {index}: {source}")]
    AtIndex {
        /// Position of the record in the input sequence
        index: usize,
        /// The underlying validation failure
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Attach the sequence position of the offending record
    pub fn at(self, index: usize) -> Self {
        match self {
            // Re-indexing replaces the old position instead of nesting
            ValidationError::AtIndex { source, .. } => ValidationError::AtIndex { index, source },
            other => ValidationError::AtIndex {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Sequence position, if one was attached
    pub fn index(&self) -> Option<usize> {
        match self {
            ValidationError::AtIndex { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The underlying failure without positional context
    pub fn root(&self) -> &ValidationError {
        match self {
            ValidationError::AtIndex { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Crate-level errors
#[derive(Error, Debug)]
pub enum Error {
    /// A raw event record failed normalization
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A sequence or parameter passed to the matcher violates its contract
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// The reason why the input is invalid
        reason: String,
    },

    /// Configuration error
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Document (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
