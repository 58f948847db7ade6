//! Meta-regression on a single study-level covariate
//!
//! Weighted least squares with fixed-effect weights `wᵢ = 1/seᵢ²`:
//!
//! ```text
//! x̄ = Σwx/Σw          ȳ = Σwy/Σw
//! slope     = Σw(x-x̄)(y-ȳ) / Σw(x-x̄)²
//! intercept = ȳ - slope·x̄
//! Q_resid   = Σw(y - ŷ)²,  df_resid = k - 2
//! ```
//!
//! With two studies the line fits exactly and `df_resid = 0`; residual I² is
//! then reported as 0, never NaN.
//!
//! The slope SE `√(1/Σw(x-x̄)²)` is the fixed-effect WLS standard error and
//! ignores residual heterogeneity.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::distribution::two_sided_p;
use crate::effect::EffectSize;
use crate::transform::{confidence_interval, i_squared, ConfidenceInterval};
use crate::{Error, Result};

/// One study's input to the regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionPoint {
    /// Effect estimate (y)
    pub estimate: f64,
    /// Standard error of the estimate
    pub se: f64,
    /// Covariate value (x)
    pub covariate: f64,
}

/// Fitted meta-regression line and residual heterogeneity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRegressionResult {
    /// Number of studies
    pub k: usize,
    /// Change in effect per unit covariate
    pub slope: f64,
    /// Fitted effect at covariate 0
    pub intercept: f64,
    /// Fixed-effect WLS standard error of the slope
    pub slope_se: f64,
    /// 95% CI of the slope
    pub slope_ci: ConfidenceInterval,
    /// Two-sided p-value for slope = 0
    pub slope_p: f64,
    /// Weighted mean covariate
    pub mean_covariate: f64,
    /// Weighted mean effect
    pub mean_estimate: f64,
    /// Percentage weights in input order
    pub weights: Vec<f64>,
    /// Weighted residual sum of squares
    #[serde(rename = "Qresidual")]
    pub q_residual: f64,
    /// `k - 2`
    #[serde(rename = "dfResidual")]
    pub df_residual: usize,
    /// Residual I² percentage, 0 when `df_residual == 0` or `Q_residual == 0`
    #[serde(rename = "I2residual")]
    pub i2_residual: f64,
    /// Smallest covariate value
    pub min_covariate: f64,
    /// Largest covariate value
    pub max_covariate: f64,
}

impl MetaRegressionResult {
    /// Fitted effect `intercept + slope·x`
    #[must_use]
    pub fn predict(&self, covariate: f64) -> f64 {
        self.slope.mul_add(covariate, self.intercept)
    }

    /// Endpoints of the fitted line over the observed covariate range,
    /// `((x_min, ŷ(x_min)), (x_max, ŷ(x_max)))`
    #[must_use]
    pub fn line_endpoints(&self) -> ((f64, f64), (f64, f64)) {
        (
            (self.min_covariate, self.predict(self.min_covariate)),
            (self.max_covariate, self.predict(self.max_covariate)),
        )
    }
}

/// Fit a meta-regression of `effects` on one covariate value per study.
///
/// # Errors
///
/// - [`Error::LengthMismatch`] when `covariate.len() != effects.len()`
/// - see [`fit_meta_regression_points`]
pub fn fit_meta_regression(
    effects: &[EffectSize],
    covariate: &[f64],
) -> Result<MetaRegressionResult> {
    if covariate.len() != effects.len() {
        return Err(Error::LengthMismatch {
            expected: effects.len(),
            actual: covariate.len(),
        });
    }
    let points: Vec<RegressionPoint> = effects
        .iter()
        .zip(covariate)
        .map(|(e, &x)| RegressionPoint {
            estimate: e.estimate,
            se: e.se,
            covariate: x,
        })
        .collect();
    fit_meta_regression_points(&points)
}

/// Fit a meta-regression from `(estimate, se, covariate)` triples.
///
/// # Errors
///
/// - [`Error::EmptyStudySet`] for no points
/// - [`Error::InsufficientStudies`] for a single point
/// - [`Error::InvalidStudyData`] for a non-finite value or `se <= 0`
/// - [`Error::DegenerateCovariate`] when every study has the same covariate
pub fn fit_meta_regression_points(points: &[RegressionPoint]) -> Result<MetaRegressionResult> {
    let k = points.len();
    if k == 0 {
        return Err(Error::EmptyStudySet);
    }
    if k < 2 {
        return Err(Error::InsufficientStudies {
            required: 2,
            actual: k,
        });
    }
    for (i, p) in points.iter().enumerate() {
        let finite = p.estimate.is_finite() && p.covariate.is_finite() && p.se.is_finite();
        if !(finite && p.se > 0.0) {
            return Err(Error::invalid_study(
                format!("study {}", i + 1),
                format!(
                    "regression needs finite estimate, covariate and se > 0 (got {}, {}, {})",
                    p.estimate, p.covariate, p.se
                ),
            ));
        }
    }

    let (min_covariate, max_covariate) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), p| (lo.min(p.covariate), hi.max(p.covariate)),
    );
    // x̄ can miss a shared value by an ulp, leaving Σw(x-x̄)² tiny but positive
    if max_covariate <= min_covariate {
        return Err(Error::DegenerateCovariate);
    }

    let weights: Vec<f64> = points.iter().map(|p| 1.0 / (p.se * p.se)).collect();
    let sum_w: f64 = weights.iter().sum();
    let mean_x = weighted_sum(points, &weights, |p| p.covariate) / sum_w;
    let mean_y = weighted_sum(points, &weights, |p| p.estimate) / sum_w;

    let sxy = weighted_sum(points, &weights, |p| {
        (p.covariate - mean_x) * (p.estimate - mean_y)
    });
    let sxx = weighted_sum(points, &weights, |p| (p.covariate - mean_x).powi(2));
    if sxx <= 0.0 {
        return Err(Error::DegenerateCovariate);
    }

    let slope = sxy / sxx;
    let intercept = slope.mul_add(-mean_x, mean_y);
    let q_residual = weighted_sum(points, &weights, |p| {
        (p.estimate - slope.mul_add(p.covariate, intercept)).powi(2)
    });
    let df_residual = k - 2;
    if df_residual == 0 {
        warn!("meta-regression on 2 studies fits exactly, residual df is 0");
    }

    let slope_se = (1.0 / sxx).sqrt();

    debug!(k, slope, intercept, q_residual, df_residual, "fitted meta-regression");

    Ok(MetaRegressionResult {
        k,
        slope,
        intercept,
        slope_se,
        slope_ci: confidence_interval(slope, slope_se),
        slope_p: two_sided_p(slope / slope_se),
        mean_covariate: mean_x,
        mean_estimate: mean_y,
        weights: weights.iter().map(|w| 100.0 * w / sum_w).collect(),
        q_residual,
        df_residual,
        i2_residual: i_squared(q_residual, df_residual),
        min_covariate,
        max_covariate,
    })
}

fn weighted_sum(
    points: &[RegressionPoint],
    weights: &[f64],
    f: impl Fn(&RegressionPoint) -> f64,
) -> f64 {
    points.iter().zip(weights).map(|(p, w)| w * f(p)).sum()
}
