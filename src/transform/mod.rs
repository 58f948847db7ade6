//! Transform library: the numeric building blocks every other module uses
//!
//! All functions here are pure and total. Degenerate inputs resolve to a
//! defined value instead of an error:
//!
//! | Function                  | Degenerate input | Result |
//! |---------------------------|------------------|--------|
//! | [`mean`], [`variance`], [`sd`] | empty slice  | `0.0`  |
//! | [`i_squared`]             | `df == 0` or `Q == 0` | `0.0` |
//! | [`tau2_dersimonian_laird`] | `k <= 1` or `Q < df` | `0.0` |
//! | [`logit`]                 | `p <= 0` or `p >= 1` | corrected by 0.005 |
//!
//! The empty-slice default deliberately hides a division by zero; callers that
//! need to distinguish "no data" from "zero spread" must check emptiness first.

mod format;
mod proportion;

pub use format::{format_number, format_p_value};
pub use proportion::{
    arcsine, arcsine_inverse, freeman_tukey, freeman_tukey_inverse, logit, logit_inverse,
    LOGIT_BOUNDARY_CORRECTION,
};

use serde::{Deserialize, Serialize};

/// Two-sided 95% normal critical value. The confidence level is not configurable.
pub const Z_CRITICAL_95: f64 = 1.96;

/// Closed interval `[lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Interval width
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `value` lies inside the closed interval
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Apply a monotone increasing map to both bounds (e.g. `exp` for ratio scales)
    #[must_use]
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            lower: f(self.lower),
            upper: f(self.upper),
        }
    }
}

impl From<ConfidenceInterval> for (f64, f64) {
    fn from(ci: ConfidenceInterval) -> Self {
        (ci.lower, ci.upper)
    }
}

/// Arithmetic mean. Empty input yields `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by `n`, not `n - 1`). Empty input yields `0.0`.
///
/// Pass `mean` when it is already known to avoid a second pass.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn variance(values: &[f64], mean: Option<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean.unwrap_or_else(|| self::mean(values));
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation, `sqrt(variance)`. Empty input yields `0.0`.
#[must_use]
pub fn sd(values: &[f64], mean: Option<f64>) -> f64 {
    variance(values, mean).sqrt()
}

/// Standard error of a mean from its SD and sample size
#[must_use]
pub fn standard_error(sd: f64, n: u32) -> f64 {
    sd / f64::from(n).sqrt()
}

/// `estimate ± 1.96·se`
#[must_use]
pub fn confidence_interval(estimate: f64, se: f64) -> ConfidenceInterval {
    ConfidenceInterval {
        lower: Z_CRITICAL_95.mul_add(-se, estimate),
        upper: Z_CRITICAL_95.mul_add(se, estimate),
    }
}

/// Higgins' I² as a percentage in `[0, 100]`.
///
/// `df == 0` yields 0. `Q == 0` with positive `df` also yields 0 rather than
/// `-inf` clamped through `max`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn i_squared(q: f64, df: usize) -> f64 {
    if df == 0 || q <= 0.0 {
        return 0.0;
    }
    ((q - df as f64) / q * 100.0).clamp(0.0, 100.0)
}

/// Cochran's Q around the weighted mean of `estimates`.
///
/// Returns `(weighted_mean, q)`.
#[must_use]
pub fn cochran_q(estimates: &[f64], weights: &[f64]) -> (f64, f64) {
    let sum_w: f64 = weights.iter().sum();
    let weighted_mean = estimates
        .iter()
        .zip(weights)
        .map(|(e, w)| e * w)
        .sum::<f64>()
        / sum_w;
    let q = estimates
        .iter()
        .zip(weights)
        .map(|(e, w)| w * (e - weighted_mean).powi(2))
        .sum();
    (weighted_mean, q)
}

/// DerSimonian-Laird method-of-moments between-study variance.
///
/// `weights` are the fixed-effect weights, normally `1 / variances[i]`.
/// Computes `C = Σw - Σw²/Σw` and returns `max(0, (Q - df) / C)`. Fewer than
/// two studies yields 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tau2_dersimonian_laird(estimates: &[f64], variances: &[f64], weights: &[f64]) -> f64 {
    let k = estimates.len();
    debug_assert_eq!(variances.len(), k, "one variance per estimate");
    debug_assert_eq!(weights.len(), k, "one weight per estimate");
    if k <= 1 {
        return 0.0;
    }

    let (_, q) = cochran_q(estimates, weights);
    let df = (k - 1) as f64;

    let sum_w: f64 = weights.iter().sum();
    let sum_w2: f64 = weights.iter().map(|w| w * w).sum();
    let c = sum_w - sum_w2 / sum_w;

    let tau2 = (q - df) / c;
    // NaN (C == 0 with Q == df) also lands on 0
    if tau2 > 0.0 {
        tau2
    } else {
        0.0
    }
}

/// Natural log of a ratio measure (RR, OR)
#[must_use]
pub fn log_ratio(ratio: f64) -> f64 {
    ratio.ln()
}

/// Back-transform a log ratio to the ratio scale
#[must_use]
pub fn exp_ratio(log_ratio: f64) -> f64 {
    log_ratio.exp()
}
