//! Approximate distribution functions
//!
//! Both CDFs are closed-form approximations, not exact implementations:
//!
//! - [`normal_cdf`] uses the Abramowitz & Stegun 26.2.17 polynomial, absolute
//!   error below 7.5e-8.
//! - [`chi_square_cdf`] is exact for `df = 1` (up to the normal
//!   approximation) and falls back to `Φ((x - df) / √(2·df))` otherwise. That
//!   fallback ignores the skew of the chi-square distribution and is coarse
//!   for small `df`. Heterogeneity p-values inherit this limitation.
//!
//! Comparisons against an exact statistics library must allow for these
//! differences.
//!
//! References:
//! - Abramowitz & Stegun (1964), Handbook of Mathematical Functions, 26.2.17

use std::f64::consts::PI;

const P: f64 = 0.231_641_9;
const B1: f64 = 0.319_381_530;
const B2: f64 = -0.356_563_782;
const B3: f64 = 1.781_477_937;
const B4: f64 = -1.821_255_978;
const B5: f64 = 1.330_274_429;

/// Standard normal CDF Φ(z), polynomial approximation
#[must_use]
pub fn normal_cdf(z: f64) -> f64 {
    let t = 1.0 / P.mul_add(z.abs(), 1.0);
    let density = (-z * z / 2.0).exp() / (2.0 * PI).sqrt();
    let poly = t * B5.mul_add(t, B4).mul_add(t, B3).mul_add(t, B2).mul_add(t, B1);
    let tail = density * poly;
    if z > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

/// Two-sided p-value `2·(1 - Φ(|z|))`
#[must_use]
pub fn two_sided_p(z: f64) -> f64 {
    2.0 * (1.0 - normal_cdf(z.abs()))
}

/// Chi-square CDF, approximate.
///
/// - `x <= 0` or `df == 0`: 0
/// - `df == 1`: `2·Φ(√x) - 1`
/// - otherwise: `Φ((x - df) / √(2·df))`, a crude normal approximation kept
///   for output parity
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn chi_square_cdf(x: f64, df: usize) -> f64 {
    if x <= 0.0 || df == 0 {
        return 0.0;
    }
    if df == 1 {
        return 2.0f64.mul_add(normal_cdf(x.sqrt()), -1.0);
    }
    let df = df as f64;
    normal_cdf((x - df) / (2.0 * df).sqrt())
}

/// Upper-tail chi-square p-value `1 - chi_square_cdf(x, df)`
#[must_use]
pub fn chi_square_sf(x: f64, df: usize) -> f64 {
    1.0 - chi_square_cdf(x, df)
}
