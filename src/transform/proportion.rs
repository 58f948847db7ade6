//! Proportion transforms and their inverses

/// Correction applied by [`logit`] at the boundaries: `p <= 0` becomes
/// `0.5 / 100`, `p >= 1` becomes `(100 - 0.5) / 100`. Not configurable.
pub const LOGIT_BOUNDARY_CORRECTION: f64 = 0.5 / 100.0;

/// Log-odds `ln(p / (1 - p))`.
///
/// Outside the open interval `(0, 1)` the proportion is first clamped to
/// `0.005` or `0.995`, so the round trip through [`logit_inverse`] is lossy
/// only at the boundary.
#[must_use]
pub fn logit(p: f64) -> f64 {
    let adjusted = if p <= 0.0 {
        LOGIT_BOUNDARY_CORRECTION
    } else if p >= 1.0 {
        1.0 - LOGIT_BOUNDARY_CORRECTION
    } else {
        p
    };
    (adjusted / (1.0 - adjusted)).ln()
}

/// Inverse logit `e^x / (1 + e^x)`
#[must_use]
pub fn logit_inverse(x: f64) -> f64 {
    let e = x.exp();
    e / (1.0 + e)
}

/// Freeman-Tukey double arcsine transform.
///
/// `0.5 · [asin(√(e/(n+1))) + asin(√((e+1)/(n+1)))]`. The denominator `n + 1`
/// is never zero.
#[must_use]
pub fn freeman_tukey(events: u32, total: u32) -> f64 {
    let denom = f64::from(total) + 1.0;
    let e = f64::from(events);
    0.5 * ((e / denom).sqrt().asin() + ((e + 1.0) / denom).sqrt().asin())
}

/// Back-transform `sin(t)²`.
///
/// This is the simple inverse, not the exact Miller inverse: the forward
/// transform smooths asymmetrically, so `freeman_tukey_inverse(freeman_tukey(e, n))`
/// is close to, but not equal to, `e / n`.
#[must_use]
pub fn freeman_tukey_inverse(t: f64) -> f64 {
    t.sin().powi(2)
}

/// Angular transform `asin(√p)`
#[must_use]
pub fn arcsine(p: f64) -> f64 {
    p.sqrt().asin()
}

/// Inverse angular transform `sin(t)²`
#[must_use]
pub fn arcsine_inverse(t: f64) -> f64 {
    t.sin().powi(2)
}
