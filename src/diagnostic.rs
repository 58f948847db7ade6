//! Diagnostic-accuracy summarizer
//!
//! Per-study sensitivity `tp/(tp+fn)` and specificity `tn/(tn+fp)`, summarized
//! by their plain unweighted means. This is illustrative pooling only: no
//! inverse-variance weighting and no bivariate or HSROC model.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::study::{DiagnosticStudy, Study};
use crate::transform::mean;
use crate::{Error, Result};

/// Accuracy of one study
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticAccuracy {
    /// True-positive rate
    pub sensitivity: f64,
    /// True-negative rate
    pub specificity: f64,
    /// `1 - specificity`
    pub false_positive_rate: f64,
}

impl DiagnosticAccuracy {
    /// Rates from raw counts.
    ///
    /// No validation: a zero denominator yields NaN.
    #[must_use]
    pub fn from_counts(study: &DiagnosticStudy) -> Self {
        let sensitivity = f64::from(study.tp) / (f64::from(study.tp) + f64::from(study.fn_));
        let specificity = f64::from(study.tn) / (f64::from(study.tn) + f64::from(study.fp));
        Self {
            sensitivity,
            specificity,
            false_positive_rate: 1.0 - specificity,
        }
    }
}

/// Per-study accuracy and the unweighted summary point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSummary {
    /// Studies in input order
    pub studies: Vec<DiagnosticAccuracy>,
    /// Mean sensitivity
    pub sensitivity: f64,
    /// Mean specificity
    pub specificity: f64,
    /// Mean false-positive rate
    pub false_positive_rate: f64,
}

/// Summarize sensitivity and specificity across studies.
///
/// # Errors
///
/// - [`Error::EmptyStudySet`] for no studies
/// - [`Error::InvalidStudyData`] when a study has `tp + fn == 0` or `tn + fp == 0`
pub fn summarize_diagnostic(studies: &[DiagnosticStudy]) -> Result<DiagnosticSummary> {
    if studies.is_empty() {
        return Err(Error::EmptyStudySet);
    }

    let studies = studies
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Study::Diagnostic(*s).validate(&format!("study {}", i + 1))?;
            Ok(DiagnosticAccuracy::from_counts(s))
        })
        .collect::<Result<Vec<_>>>()?;

    let sens: Vec<f64> = studies.iter().map(|a| a.sensitivity).collect();
    let spec: Vec<f64> = studies.iter().map(|a| a.specificity).collect();
    let sensitivity = mean(&sens);
    let specificity = mean(&spec);

    debug!(k = studies.len(), sensitivity, specificity, "summarized diagnostic accuracy");

    Ok(DiagnosticSummary {
        studies,
        sensitivity,
        specificity,
        false_positive_rate: 1.0 - specificity,
    })
}
