//! Single-arm proportion effect sizes

use serde::{Deserialize, Serialize};

use super::EffectSize;
use crate::config::ProportionTransform;
use crate::study::ProportionStudy;
use crate::transform::{
    arcsine, arcsine_inverse, freeman_tukey, freeman_tukey_inverse, logit, logit_inverse,
};

/// A proportion on its analysis scale, with the raw and back-transformed values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionEffect {
    /// `events / total`
    pub raw: f64,
    /// Transform the effect is expressed on
    pub transform: ProportionTransform,
    /// Estimate and SE on the transformed scale
    pub effect: EffectSize,
    /// Transformed estimate mapped back to a proportion
    pub back_transformed: f64,
}

/// Map a value on a transformed scale back to a proportion
#[must_use]
pub fn back_transform(transform: ProportionTransform, value: f64) -> f64 {
    match transform {
        ProportionTransform::None => value,
        ProportionTransform::Logit => logit_inverse(value),
        ProportionTransform::FreemanTukey => freeman_tukey_inverse(value),
        ProportionTransform::Arcsine => arcsine_inverse(value),
    }
}

/// Express a single-arm proportion on the requested scale.
///
/// | Transform       | Estimate               | SE                              |
/// |-----------------|------------------------|---------------------------------|
/// | `None`          | `p`                    | `√(p(1-p)/n)`                   |
/// | `Logit`         | `logit(p)`             | `√(1/(e+0.5) + 1/(n-e+0.5))`    |
/// | `FreemanTukey`  | `freeman_tukey(e, n)`  | `√(1/(4n))`                     |
/// | `Arcsine`       | `asin(√p)`             | `√(1/(4n))`                     |
///
/// Under `None` a proportion of exactly 0 or 1 has zero SE.
#[must_use]
pub fn proportion_effect(
    study: &ProportionStudy,
    transform: ProportionTransform,
) -> ProportionEffect {
    let e = f64::from(study.events);
    let n = f64::from(study.total);
    let p = study.proportion();

    let (estimate, se) = match transform {
        ProportionTransform::None => (p, (p * (1.0 - p) / n).sqrt()),
        ProportionTransform::Logit => (
            logit(p),
            (1.0 / (e + 0.5) + 1.0 / (n - e + 0.5)).sqrt(),
        ),
        ProportionTransform::FreemanTukey => (
            freeman_tukey(study.events, study.total),
            (1.0 / (4.0 * n)).sqrt(),
        ),
        ProportionTransform::Arcsine => (arcsine(p), (1.0 / (4.0 * n)).sqrt()),
    };

    ProportionEffect {
        raw: p,
        transform,
        effect: EffectSize::from_se(estimate, se),
        back_transformed: back_transform(transform, estimate),
    }
}
