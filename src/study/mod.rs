//! Study records
//!
//! A [`Study`] is the immutable raw input for one trial, tagged by outcome
//! type. The effect-size calculator matches on it exhaustively, so a study of
//! the wrong shape can never reach a measure function unnoticed.
//!
//! ```text
//! Study ──┬── Continuous { treatment: {mean, sd, n}, control: {mean, sd, n} }
//!         ├── Binary     { treatment: {events, total}, control: {events, total} }
//!         ├── Proportion { events, total }
//!         └── Diagnostic { tp, fp, fn, tn }
//! ```
//!
//! Construction does not validate. Call [`Study::validate`] (the validating
//! entry points in [`crate::effect`], [`crate::pooling`] and
//! [`crate::diagnostic`] do) to turn bad input into
//! [`Error::InvalidStudyData`] instead of NaN.

mod validate;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One arm of a continuous-outcome study
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousArm {
    /// Arm mean
    pub mean: f64,
    /// Arm standard deviation (must be >= 0)
    pub sd: f64,
    /// Arm sample size (must be >= 1)
    pub n: u32,
}

impl ContinuousArm {
    /// Create an arm summary
    #[must_use]
    pub const fn new(mean: f64, sd: f64, n: u32) -> Self {
        Self { mean, sd, n }
    }
}

/// Two-arm continuous study
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousStudy {
    /// Treatment arm
    pub treatment: ContinuousArm,
    /// Control arm
    pub control: ContinuousArm,
}

/// One arm of a binary-outcome study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryArm {
    /// Participants with the event
    pub events: u32,
    /// Participants in the arm
    pub total: u32,
}

impl BinaryArm {
    /// Create an arm count
    #[must_use]
    pub const fn new(events: u32, total: u32) -> Self {
        Self { events, total }
    }

    /// Participants without the event. Saturates at 0 for invalid input.
    #[must_use]
    pub const fn non_events(&self) -> u32 {
        self.total.saturating_sub(self.events)
    }
}

/// Two-arm binary study (2x2 table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryStudy {
    /// Treatment arm
    pub treatment: BinaryArm,
    /// Control arm
    pub control: BinaryArm,
}

/// Single-arm proportion study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProportionStudy {
    /// Participants with the event
    pub events: u32,
    /// Participants observed
    pub total: u32,
}

impl ProportionStudy {
    /// Create a proportion study
    #[must_use]
    pub const fn new(events: u32, total: u32) -> Self {
        Self { events, total }
    }

    /// Raw proportion `events / total`
    #[must_use]
    pub fn proportion(&self) -> f64 {
        f64::from(self.events) / f64::from(self.total)
    }
}

/// Diagnostic-accuracy confusion counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticStudy {
    /// True positives
    pub tp: u32,
    /// False positives
    pub fp: u32,
    /// False negatives
    #[serde(rename = "fn")]
    pub fn_: u32,
    /// True negatives
    pub tn: u32,
}

impl DiagnosticStudy {
    /// Create a confusion count record
    #[must_use]
    pub const fn new(tp: u32, fp: u32, fn_: u32, tn: u32) -> Self {
        Self { tp, fp, fn_, tn }
    }
}

/// Study record, tagged by outcome type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Study {
    /// Two-arm means/SDs/sizes
    Continuous(ContinuousStudy),
    /// Two-arm event counts
    Binary(BinaryStudy),
    /// Single-arm event count
    Proportion(ProportionStudy),
    /// Diagnostic 2x2 counts
    Diagnostic(DiagnosticStudy),
}

impl Study {
    /// Build a continuous study from its two arms
    #[must_use]
    pub const fn continuous(treatment: ContinuousArm, control: ContinuousArm) -> Self {
        Self::Continuous(ContinuousStudy { treatment, control })
    }

    /// Build a binary study from its two arms
    #[must_use]
    pub const fn binary(treatment: BinaryArm, control: BinaryArm) -> Self {
        Self::Binary(BinaryStudy { treatment, control })
    }

    /// Build a single-arm proportion study
    #[must_use]
    pub const fn proportion(events: u32, total: u32) -> Self {
        Self::Proportion(ProportionStudy::new(events, total))
    }

    /// Build a diagnostic study
    #[must_use]
    pub const fn diagnostic(tp: u32, fp: u32, fn_: u32, tn: u32) -> Self {
        Self::Diagnostic(DiagnosticStudy::new(tp, fp, fn_, tn))
    }

    /// Outcome type name, as used in the JSON tag
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Continuous(_) => "continuous",
            Self::Binary(_) => "binary",
            Self::Proportion(_) => "proportion",
            Self::Diagnostic(_) => "diagnostic",
        }
    }

    /// Check the record's invariants.
    ///
    /// `label` names the study in the error message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStudyData`] describing the first violated invariant.
    pub fn validate(&self, label: &str) -> Result<()> {
        match self {
            Self::Continuous(s) => validate::continuous(s, label),
            Self::Binary(s) => validate::binary(s, label),
            Self::Proportion(s) => validate::proportion(s, label),
            Self::Diagnostic(s) => validate::diagnostic(s, label),
        }
    }

    /// Borrow the continuous payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeasureMismatch`] for any other outcome type.
    pub fn as_continuous(&self) -> Result<&ContinuousStudy> {
        match self {
            Self::Continuous(s) => Ok(s),
            other => Err(Error::MeasureMismatch {
                expected: "continuous",
                actual: other.kind(),
            }),
        }
    }

    /// Borrow the binary payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeasureMismatch`] for any other outcome type.
    pub fn as_binary(&self) -> Result<&BinaryStudy> {
        match self {
            Self::Binary(s) => Ok(s),
            other => Err(Error::MeasureMismatch {
                expected: "binary",
                actual: other.kind(),
            }),
        }
    }

    /// Borrow the proportion payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeasureMismatch`] for any other outcome type.
    pub fn as_proportion(&self) -> Result<&ProportionStudy> {
        match self {
            Self::Proportion(s) => Ok(s),
            other => Err(Error::MeasureMismatch {
                expected: "proportion",
                actual: other.kind(),
            }),
        }
    }

    /// Borrow the diagnostic payload
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeasureMismatch`] for any other outcome type.
    pub fn as_diagnostic(&self) -> Result<&DiagnosticStudy> {
        match self {
            Self::Diagnostic(s) => Ok(s),
            other => Err(Error::MeasureMismatch {
                expected: "diagnostic",
                actual: other.kind(),
            }),
        }
    }
}

impl From<ContinuousStudy> for Study {
    fn from(study: ContinuousStudy) -> Self {
        Self::Continuous(study)
    }
}

impl From<BinaryStudy> for Study {
    fn from(study: BinaryStudy) -> Self {
        Self::Binary(study)
    }
}

impl From<ProportionStudy> for Study {
    fn from(study: ProportionStudy) -> Self {
        Self::Proportion(study)
    }
}

impl From<DiagnosticStudy> for Study {
    fn from(study: DiagnosticStudy) -> Self {
        Self::Diagnostic(study)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Study::proportion(1, 10).kind(), "proportion");
        assert_eq!(Study::diagnostic(1, 2, 3, 4).kind(), "diagnostic");
    }

    #[test]
    fn test_json_tagging() {
        let json = r#"{"type":"diagnostic","tp":85,"fp":12,"fn":8,"tn":95}"#;
        let study: Study = serde_json::from_str(json).unwrap();
        assert_eq!(study, Study::diagnostic(85, 12, 8, 95));

        let back = serde_json::to_string(&study).unwrap();
        assert!(back.contains(r#""type":"diagnostic""#));
        assert!(back.contains(r#""fn":8"#));
    }

    #[test]
    fn test_binary_json() {
        let json = r#"{
            "type": "binary",
            "treatment": { "events": 0, "total": 180 },
            "control": { "events": 4, "total": 175 }
        }"#;
        let study: Study = serde_json::from_str(json).unwrap();
        let binary = study.as_binary().unwrap();
        assert_eq!(binary.treatment.events, 0);
        assert_eq!(binary.control.non_events(), 171);
    }

    #[test]
    fn test_payload_mismatch() {
        let study = Study::proportion(3, 10);
        let err = study.as_continuous().unwrap_err();
        assert!(matches!(
            err,
            Error::MeasureMismatch {
                expected: "continuous",
                actual: "proportion"
            }
        ));
    }

    #[test]
    fn test_non_events_saturates() {
        assert_eq!(BinaryArm::new(12, 10).non_events(), 0);
    }
}
