//! Error types for metastat
//!
//! The numeric kernels are total and never fail; errors only come from the
//! validating entry points and from dataset loading.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Metastat error types
#[derive(Error, Debug)]
pub enum Error {
    /// A study record violates its invariants (negative SD, zero n, events > total, ...)
    #[error("Invalid study data in '{study}': {reason}")]
    InvalidStudyData {
        /// Study identifier (or position) that failed validation
        study: String,
        /// Which invariant was violated
        reason: String,
    },

    /// Aggregation over zero studies
    #[error("Empty study set: pooling requires at least one study")]
    EmptyStudySet,

    /// Parallel inputs of different lengths
    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch {
        /// Number of effect sizes
        expected: usize,
        /// Number of covariate values supplied
        actual: usize,
    },

    /// Too few studies for the requested model
    #[error("Insufficient studies: need at least {required}, got {actual}")]
    InsufficientStudies {
        /// Minimum number of studies
        required: usize,
        /// Number of studies supplied
        actual: usize,
    },

    /// Covariate has no weighted spread, slope is undefined
    #[error("Degenerate covariate: all studies share the same covariate value")]
    DegenerateCovariate,

    /// Study outcome type does not match the requested effect measure
    #[error("Measure mismatch: expected a {expected} study, got {actual}")]
    MeasureMismatch {
        /// Outcome type the measure needs
        expected: &'static str,
        /// Outcome type that was supplied
        actual: &'static str,
    },

    /// Dataset JSON could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidStudyData`].
    pub fn invalid_study(study: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStudyData {
            study: study.into(),
            reason: reason.into(),
        }
    }
}
