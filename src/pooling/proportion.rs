//! Single-arm proportion pooling on a transformed scale

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProportionTransform;
use crate::effect::{back_transform, proportion_effect, ProportionEffect};
use crate::study::{ProportionStudy, Study};
use crate::transform::{cochran_q, confidence_interval, i_squared, ConfidenceInterval};
use crate::{Error, Result};

/// Inverse-variance pooled proportion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProportionPoolResult {
    /// Scale the pooling was done on
    pub transform: ProportionTransform,
    /// Per-study values, in input order
    pub studies: Vec<ProportionEffect>,
    /// Percentage weights, in input order
    pub weights: Vec<f64>,
    /// Pooled estimate on the transformed scale
    pub pooled_transformed: f64,
    /// SE on the transformed scale
    pub se: f64,
    /// 95% CI on the transformed scale
    pub ci: ConfidenceInterval,
    /// Pooled estimate back-transformed to a proportion
    pub pooled_proportion: f64,
    /// CI bounds back-transformed to proportions
    pub proportion_ci: ConfidenceInterval,
    /// Cochran's Q on the transformed scale
    #[serde(rename = "Q")]
    pub q: f64,
    /// `k - 1`
    pub df: usize,
    /// I² percentage
    #[serde(rename = "I2")]
    pub i2: f64,
}

/// Pool single-arm proportions with fixed inverse-variance weights on the
/// `transform` scale, then back-transform.
///
/// Transformed CI bounds are clamped to the transform's domain (`[0, 1]` for
/// raw proportions, `[0, π/2]` for the angular transforms) before
/// back-transforming, since `sin²` is not monotone outside it.
///
/// # Errors
///
/// - [`Error::EmptyStudySet`] for no studies
/// - [`Error::InvalidStudyData`] if a study fails validation, or has zero SE on
///   the chosen scale (a raw proportion of exactly 0 or 1)
pub fn pool_proportions(
    studies: &[ProportionStudy],
    transform: ProportionTransform,
) -> Result<ProportionPoolResult> {
    if studies.is_empty() {
        return Err(Error::EmptyStudySet);
    }

    let mut effects = Vec::with_capacity(studies.len());
    for (i, study) in studies.iter().enumerate() {
        let label = format!("study {}", i + 1);
        Study::Proportion(*study).validate(&label)?;
        let effect = proportion_effect(study, transform);
        if effect.effect.se <= 0.0 {
            return Err(Error::invalid_study(
                label,
                format!(
                    "zero standard error on the '{}' scale, choose a transform",
                    transform.label()
                ),
            ));
        }
        effects.push(effect);
    }

    let estimates: Vec<f64> = effects.iter().map(|e| e.effect.estimate).collect();
    let weights: Vec<f64> = effects.iter().map(|e| 1.0 / e.effect.variance).collect();
    let sum_w: f64 = weights.iter().sum();

    let (pooled, q) = cochran_q(&estimates, &weights);
    let se = (1.0 / sum_w).sqrt();
    let ci = confidence_interval(pooled, se);
    let df = studies.len() - 1;

    let (lo, hi) = match transform {
        ProportionTransform::None => (0.0, 1.0),
        ProportionTransform::FreemanTukey | ProportionTransform::Arcsine => (0.0, FRAC_PI_2),
        ProportionTransform::Logit => (f64::NEG_INFINITY, f64::INFINITY),
    };
    let proportion_ci = ConfidenceInterval {
        lower: back_transform(transform, ci.lower.clamp(lo, hi)),
        upper: back_transform(transform, ci.upper.clamp(lo, hi)),
    };
    let pooled_proportion = back_transform(transform, pooled);

    debug!(
        k = studies.len(),
        transform = transform.label(),
        pooled_proportion,
        q,
        "pooled proportions"
    );

    Ok(ProportionPoolResult {
        transform,
        studies: effects,
        weights: weights.iter().map(|w| 100.0 * w / sum_w).collect(),
        pooled_transformed: pooled,
        se,
        ci,
        pooled_proportion,
        proportion_ci,
        q,
        df,
        i2: i_squared(q, df),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn studies() -> Vec<ProportionStudy> {
        vec![
            ProportionStudy::new(15, 120),
            ProportionStudy::new(22, 185),
            ProportionStudy::new(8, 95),
            ProportionStudy::new(31, 250),
            ProportionStudy::new(18, 150),
            ProportionStudy::new(12, 110),
            ProportionStudy::new(25, 200),
        ]
    }

    #[test]
    fn test_every_transform_lands_near_raw_rate() {
        // overall crude rate is 131 / 1110 ≈ 0.118
        for transform in [
            ProportionTransform::None,
            ProportionTransform::Logit,
            ProportionTransform::FreemanTukey,
            ProportionTransform::Arcsine,
        ] {
            let r = pool_proportions(&studies(), transform).unwrap();
            assert!(
                (r.pooled_proportion - 0.118).abs() < 0.01,
                "{transform:?}: {}",
                r.pooled_proportion
            );
            assert!(r.proportion_ci.lower <= r.pooled_proportion);
            assert!(r.proportion_ci.upper >= r.pooled_proportion);
            let total: f64 = r.weights.iter().sum();
            assert!((total - 100.0).abs() < 1e-9);
            assert_eq!(r.df, 6);
        }
    }

    #[test]
    fn test_raw_pooling_hand_computed() {
        let two = [ProportionStudy::new(10, 100), ProportionStudy::new(30, 100)];
        let r = pool_proportions(&two, ProportionTransform::None).unwrap();
        let w1 = 100.0 / (0.1 * 0.9);
        let w2 = 100.0 / (0.3 * 0.7);
        let mean = (0.1 * w1 + 0.3 * w2) / (w1 + w2);
        assert!((r.pooled_transformed - mean).abs() < 1e-12);
        assert!((r.pooled_proportion - mean).abs() < 1e-12);
        assert!((r.se - (1.0 / (w1 + w2)).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_events_needs_a_transform() {
        let s = [ProportionStudy::new(0, 50), ProportionStudy::new(5, 50)];
        let err = pool_proportions(&s, ProportionTransform::None).unwrap_err();
        assert!(err.to_string().contains("zero standard error"));
        let r = pool_proportions(&s, ProportionTransform::FreemanTukey).unwrap();
        assert!(r.proportion_ci.lower >= 0.0);
        assert!(r.pooled_proportion > 0.0 && r.pooled_proportion < 0.1);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(matches!(
            pool_proportions(&[], ProportionTransform::Logit),
            Err(Error::EmptyStudySet)
        ));
        assert!(
            pool_proportions(&[ProportionStudy::new(6, 5)], ProportionTransform::Logit).is_err()
        );
    }
}
