//! Effect size calculator
//!
//! Converts one [`Study`] into one [`EffectSize`] on the scale chosen by the
//! [`AnalysisConfig`]:
//!
//! | Outcome     | Measures                          | Module        |
//! |-------------|-----------------------------------|---------------|
//! | continuous  | MD, SMD (Cohen's d)               | `continuous`  |
//! | binary      | log RR, log OR                    | `binary`      |
//! | proportion  | raw, logit, Freeman-Tukey, arcsine | `proportion` |
//!
//! The measure functions themselves are raw formulas: they do not validate
//! and return NaN or infinity on invalid input. [`compute_effect`] and
//! [`compute_effects`] validate first and report [`Error::InvalidStudyData`].

mod binary;
mod continuous;
mod proportion;

pub use binary::{log_odds_ratio, log_risk_ratio, TwoByTwo, CONTINUITY_CORRECTION};
pub use continuous::{mean_difference, pooled_sd, standardized_mean_difference};
pub use proportion::{back_transform, proportion_effect, ProportionEffect};

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, BinaryMeasure, ContinuousMeasure};
use crate::study::Study;
use crate::transform::{confidence_interval, ConfidenceInterval};
use crate::{Error, Result};

/// Standardized effect estimate for one study
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Point estimate
    pub estimate: f64,
    /// Standard error, `sqrt(variance)`
    pub se: f64,
    /// Sampling variance
    pub variance: f64,
    /// `estimate ± 1.96·se`
    pub ci: ConfidenceInterval,
    /// Percentage weight in `[0, 100]`, set by pooling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EffectSize {
    /// Build from an estimate and its variance; SE and CI are derived
    #[must_use]
    pub fn from_variance(estimate: f64, variance: f64) -> Self {
        let se = variance.sqrt();
        Self {
            estimate,
            se,
            variance,
            ci: confidence_interval(estimate, se),
            weight: None,
        }
    }

    /// Build from an estimate and its standard error
    #[must_use]
    pub fn from_se(estimate: f64, se: f64) -> Self {
        Self {
            estimate,
            se,
            variance: se * se,
            ci: confidence_interval(estimate, se),
            weight: None,
        }
    }

    /// Copy with a percentage weight attached
    #[must_use]
    pub const fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Validate one study and compute its effect size under `config`.
///
/// `label` names the study in validation errors.
///
/// # Errors
///
/// - [`Error::InvalidStudyData`] if the study violates its invariants, or an
///   SMD is requested with `n1 + n2 <= 2` or a zero pooled SD
/// - [`Error::MeasureMismatch`] for diagnostic studies, which have no
///   single effect size
pub fn compute_effect(study: &Study, config: &AnalysisConfig, label: &str) -> Result<EffectSize> {
    study.validate(label)?;
    match study {
        Study::Continuous(s) => match config.continuous_measure {
            ContinuousMeasure::MeanDifference => Ok(mean_difference(s)),
            ContinuousMeasure::StandardizedMeanDifference => {
                if u64::from(s.treatment.n) + u64::from(s.control.n) <= 2 {
                    return Err(Error::invalid_study(
                        label,
                        "SMD needs n1 + n2 > 2 for a pooled SD",
                    ));
                }
                if pooled_sd(s) <= 0.0 {
                    return Err(Error::invalid_study(label, "pooled SD is zero, SMD undefined"));
                }
                Ok(standardized_mean_difference(s))
            }
        },
        Study::Binary(s) => Ok(match config.binary_measure {
            BinaryMeasure::LogRiskRatio => log_risk_ratio(s),
            BinaryMeasure::LogOddsRatio => log_odds_ratio(s),
        }),
        Study::Proportion(s) => Ok(proportion_effect(s, config.proportion_transform).effect),
        Study::Diagnostic(_) => Err(Error::MeasureMismatch {
            expected: "continuous, binary or proportion",
            actual: study.kind(),
        }),
    }
}

/// Compute effect sizes for an ordered collection, preserving order.
///
/// Studies are labelled by 1-based position in errors. With the `parallel`
/// feature the work runs on the rayon pool; the result order and the reported
/// error are unchanged.
///
/// # Errors
///
/// The error of the lowest-positioned failing study.
pub fn compute_effects(studies: &[Study], config: &AnalysisConfig) -> Result<Vec<EffectSize>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        // rayon's short-circuiting collect keeps whichever error lands first
        let results: Vec<Result<EffectSize>> = studies
            .par_iter()
            .enumerate()
            .map(|(i, study)| compute_effect(study, config, &format!("study {}", i + 1)))
            .collect();
        results.into_iter().collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        studies
            .iter()
            .enumerate()
            .map(|(i, study)| compute_effect(study, config, &format!("study {}", i + 1)))
            .collect()
    }
}
