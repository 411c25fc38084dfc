//! Error types for luna-track.
//!
//! Almost every tracker operation is infallible. The exceptions are parsing a
//! date key, entering a metric value, and loading configuration.

use thiserror::Error;

use crate::model::{Condition, MetricField};

/// The main error type for luna-track operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A date key was not in `YYYY-MM-DD` form or named no real day.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The text that failed to parse.
        input: String,
    },

    /// A numeric metric received text that is not a usable number.
    #[error("invalid {field} '{input}': {reason}")]
    InvalidNumber {
        /// The metric being edited.
        field: MetricField,
        /// The raw text entered.
        input: String,
        /// Why the text was refused.
        reason: &'static str,
    },

    /// The metric is not part of the active condition's metric set.
    #[error("{field} is not tracked for {condition}")]
    MetricNotTracked {
        /// The metric being edited.
        field: MetricField,
        /// The condition currently chosen.
        condition: Condition,
    },

    /// A numeric field was given a severity, or a severity field a number.
    #[error("{field} does not take a {given} value")]
    MetricKindMismatch {
        /// The metric being edited.
        field: MetricField,
        /// The kind of value supplied.
        given: &'static str,
    },

    /// A condition-dependent operation ran before onboarding finished.
    #[error("no condition selected yet")]
    ConditionUnset,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for luna-track operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid number error for a metric field.
    #[must_use]
    pub fn invalid_number(field: MetricField, input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidNumber {
            field,
            input: input.into(),
            reason,
        }
    }

    /// Check if this error came from user input rather than the environment.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate { .. }
                | Self::InvalidNumber { .. }
                | Self::MetricNotTracked { .. }
                | Self::MetricKindMismatch { .. }
                | Self::ConditionUnset
        )
    }
}
