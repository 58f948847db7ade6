//! Pooling engine: inverse-variance fixed- and random-effects meta-analysis
//!
//! ## Algorithm
//!
//! 1. Fixed-effect weights `wᵢ = 1/vᵢ`, pooled mean `Σwᵢyᵢ/Σwᵢ`, SE `√(1/Σwᵢ)`
//! 2. Cochran's Q around the fixed mean, `df = k - 1`, p from the approximate
//!    chi-square CDF
//! 3. I² and DerSimonian-Laird τ²
//! 4. Random-effects (only when requested AND `τ² > 0`): weights `1/(vᵢ + τ²)`,
//!    pooled mean and SE recomputed
//! 5. Percentage weights `100·wᵢ/Σw` from whichever weight set was used
//! 6. `z = estimate/SE`, two-sided p from the approximate normal CDF
//!
//! A single study pools to itself: its estimate and SE are returned unchanged
//! with `Q = I² = τ² = 0`.
//!
//! A random-effects request with `τ² == 0` yields exactly the fixed-effect
//! result. [`MetaAnalysisResult::model_used`] records which model produced the
//! numbers.
//!
//! Results are recomputed from scratch on every call; nothing is cached.
//!
//! References:
//! - DerSimonian & Laird (1986), Meta-analysis in clinical trials
//! - Higgins & Thompson (2002), Quantifying heterogeneity in a meta-analysis

mod funnel;
mod proportion;

pub use funnel::{funnel_plot_data, FunnelData, FunnelPoint};
pub use proportion::{pool_proportions, ProportionPoolResult};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::ModelType;
use crate::distribution::{chi_square_sf, two_sided_p};
use crate::effect::EffectSize;
use crate::transform::{
    cochran_q, confidence_interval, exp_ratio, i_squared, tau2_dersimonian_laird,
    ConfidenceInterval,
};
use crate::{Error, Result};

/// Between-study heterogeneity statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heterogeneity {
    /// Cochran's Q around the fixed-effect estimate
    #[serde(rename = "Q")]
    pub q: f64,
    /// Degrees of freedom, `k - 1`
    pub df: usize,
    /// `1 - chi_square_cdf(Q, df)`. Uses the normal approximation for
    /// `df > 1` and is therefore approximate.
    pub p: f64,
    /// I² percentage in `[0, 100]`
    #[serde(rename = "I2")]
    pub i2: f64,
    /// DerSimonian-Laird between-study variance, `>= 0`
    pub tau2: f64,
}

/// Pooled result over an ordered collection of effect sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaAnalysisResult {
    /// Model the caller asked for
    pub model: ModelType,
    /// Model that produced the numbers (fixed when random was asked for but τ² = 0)
    pub model_used: ModelType,
    /// Pooled estimate
    pub estimate: f64,
    /// Pooled standard error
    pub se: f64,
    /// 95% CI of the pooled estimate
    pub ci: ConfidenceInterval,
    /// `estimate / se`
    pub z: f64,
    /// Two-sided p-value for `z`
    pub p: f64,
    /// Heterogeneity statistics
    pub heterogeneity: Heterogeneity,
    /// Input effect sizes, in input order, each with its percentage weight
    pub studies: Vec<EffectSize>,
}

impl MetaAnalysisResult {
    /// Number of pooled studies
    #[must_use]
    pub fn k(&self) -> usize {
        self.studies.len()
    }

    /// Percentage weights in input order
    #[must_use]
    pub fn weights(&self) -> Vec<f64> {
        self.studies
            .iter()
            .map(|s| s.weight.unwrap_or(0.0))
            .collect()
    }

    /// Pooled estimate and CI exponentiated, for log RR / log OR analyses
    #[must_use]
    pub fn exponentiated(&self) -> (f64, ConfidenceInterval) {
        (exp_ratio(self.estimate), self.ci.map(exp_ratio))
    }
}

/// Pool effect sizes with the requested model.
///
/// # Errors
///
/// - [`Error::EmptyStudySet`] when `effects` is empty
/// - [`Error::InvalidStudyData`] when an effect has a non-finite estimate or a
///   variance that is not strictly positive and finite (its weight would be
///   infinite)
///
/// # Example
///
/// ```rust
/// use metastat::config::ModelType;
/// use metastat::effect::EffectSize;
/// use metastat::pooling::meta_analyze;
///
/// # fn main() -> metastat::Result<()> {
/// let effects = [
///     EffectSize::from_variance(-6.0, 2.1),
///     EffectSize::from_variance(-5.0, 2.7),
/// ];
/// let result = meta_analyze(&effects, ModelType::Fixed)?;
/// assert!(result.estimate < -5.0 && result.estimate > -6.0);
/// # Ok(())
/// # }
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn meta_analyze(effects: &[EffectSize], model: ModelType) -> Result<MetaAnalysisResult> {
    if effects.is_empty() {
        return Err(Error::EmptyStudySet);
    }
    check_effects(effects)?;

    let k = effects.len();
    let estimates: Vec<f64> = effects.iter().map(|e| e.estimate).collect();
    let variances: Vec<f64> = effects.iter().map(|e| e.variance).collect();

    // Fixed effect; a single study passes through bit-for-bit
    let fixed_weights: Vec<f64> = variances.iter().map(|v| 1.0 / v).collect();
    let (fixed_estimate, q, fixed_se) = if let [only] = effects {
        (only.estimate, 0.0, only.se)
    } else {
        let (mean, q) = cochran_q(&estimates, &fixed_weights);
        let fixed_sum: f64 = fixed_weights.iter().sum();
        (mean, q, (1.0 / fixed_sum).sqrt())
    };

    let df = k - 1;
    let heterogeneity = Heterogeneity {
        q,
        df,
        p: chi_square_sf(q, df),
        i2: i_squared(q, df),
        tau2: tau2_dersimonian_laird(&estimates, &variances, &fixed_weights),
    };

    let use_random = model == ModelType::Random && heterogeneity.tau2 > 0.0;
    let (model_used, estimate, se, weights) = if use_random {
        let random_weights: Vec<f64> = variances
            .iter()
            .map(|v| 1.0 / (v + heterogeneity.tau2))
            .collect();
        let (random_estimate, _) = cochran_q(&estimates, &random_weights);
        let random_sum: f64 = random_weights.iter().sum();
        (
            ModelType::Random,
            random_estimate,
            (1.0 / random_sum).sqrt(),
            random_weights,
        )
    } else {
        if model == ModelType::Random && k > 1 {
            warn!(k, q, "tau² is 0, random-effects model reduces to fixed-effect");
        }
        (ModelType::Fixed, fixed_estimate, fixed_se, fixed_weights)
    };

    let sum_w: f64 = weights.iter().sum();
    let studies: Vec<EffectSize> = effects
        .iter()
        .zip(&weights)
        .map(|(effect, w)| effect.with_weight(100.0 * w / sum_w))
        .collect();
    for (i, s) in studies.iter().enumerate() {
        trace!(study = i + 1, estimate = s.estimate, weight = ?s.weight, "study weight");
    }

    let z = estimate / se;
    debug!(
        k,
        requested = ?model,
        used = ?model_used,
        estimate,
        se,
        q,
        i2 = heterogeneity.i2,
        tau2 = heterogeneity.tau2,
        "pooled effect sizes"
    );

    Ok(MetaAnalysisResult {
        model,
        model_used,
        estimate,
        se,
        ci: confidence_interval(estimate, se),
        z,
        p: two_sided_p(z),
        heterogeneity,
        studies,
    })
}

fn check_effects(effects: &[EffectSize]) -> Result<()> {
    for (i, effect) in effects.iter().enumerate() {
        if !effect.estimate.is_finite() {
            return Err(Error::invalid_study(
                format!("effect {}", i + 1),
                format!("estimate is not finite ({})", effect.estimate),
            ));
        }
        if !(effect.variance.is_finite() && effect.variance > 0.0) {
            return Err(Error::invalid_study(
                format!("effect {}", i + 1),
                format!("variance must be positive and finite ({})", effect.variance),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects() -> Vec<EffectSize> {
        vec![
            EffectSize::from_variance(0.10, 0.04),
            EffectSize::from_variance(0.30, 0.02),
            EffectSize::from_variance(0.90, 0.05),
            EffectSize::from_variance(-0.20, 0.03),
        ]
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            meta_analyze(&[], ModelType::Fixed),
            Err(Error::EmptyStudySet)
        ));
    }

    #[test]
    fn test_zero_variance_rejected() {
        let err =
            meta_analyze(&[EffectSize::from_variance(1.0, 0.0)], ModelType::Fixed).unwrap_err();
        assert!(err.to_string().contains("effect 1"));
    }

    #[test]
    fn test_single_study_passthrough() {
        let es = EffectSize::from_variance(0.42, 0.09);
        for model in [ModelType::Fixed, ModelType::Random] {
            let r = meta_analyze(&[es], model).unwrap();
            assert_eq!(r.estimate.to_bits(), es.estimate.to_bits());
            assert_eq!(r.se.to_bits(), es.se.to_bits());
            assert_eq!(r.ci, es.ci);
            assert!(r.heterogeneity.q.abs() < f64::EPSILON);
            assert_eq!(r.heterogeneity.df, 0);
            assert!(r.heterogeneity.i2.abs() < f64::EPSILON);
            assert!(r.heterogeneity.tau2.abs() < f64::EPSILON);
            assert_eq!(r.model_used, ModelType::Fixed);
            assert_eq!(r.weights(), vec![100.0]);
        }
    }

    #[test]
    fn test_single_study_se_not_recomputed() {
        // sqrt(1 / (1 / se²)) drifts by an ulp for some of these
        for i in 1..=200 {
            let es = EffectSize::from_se(0.1, f64::from(i) * 0.0137);
            let r = meta_analyze(&[es], ModelType::Fixed).unwrap();
            assert_eq!(r.se.to_bits(), es.se.to_bits(), "se = {}", es.se);
            assert_eq!(r.estimate.to_bits(), es.estimate.to_bits());
        }
    }

    #[test]
    fn test_fixed_effect_hand_computed() {
        let r = meta_analyze(&effects(), ModelType::Fixed).unwrap();
        let w = [25.0, 50.0, 20.0, 100.0 / 3.0];
        let y = [0.10, 0.30, 0.90, -0.20];
        let sw: f64 = w.iter().sum();
        let mean = w.iter().zip(&y).map(|(w, y)| w * y).sum::<f64>() / sw;
        let q: f64 = w.iter().zip(&y).map(|(w, y)| w * (y - mean).powi(2)).sum();
        assert!((r.estimate - mean).abs() < 1e-12);
        assert!((r.se - (1.0 / sw).sqrt()).abs() < 1e-12);
        assert!((r.heterogeneity.q - q).abs() < 1e-9);
        assert_eq!(r.heterogeneity.df, 3);
        assert!((r.z - mean / (1.0 / sw).sqrt()).abs() < 1e-9);
        let total: f64 = r.weights().iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_random_effects_widens_se() {
        let fixed = meta_analyze(&effects(), ModelType::Fixed).unwrap();
        let random = meta_analyze(&effects(), ModelType::Random).unwrap();
        assert!(random.heterogeneity.tau2 > 0.0);
        assert_eq!(random.model_used, ModelType::Random);
        assert!(random.se > fixed.se);
        let total: f64 = random.weights().iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        // random-effects weights are more even than fixed ones
        let spread = |w: Vec<f64>| {
            w.iter().copied().fold(f64::MIN, f64::max) - w.iter().copied().fold(f64::MAX, f64::min)
        };
        assert!(spread(random.weights()) < spread(fixed.weights()));
    }

    #[test]
    fn test_random_degrades_to_fixed_without_heterogeneity() {
        let homogeneous = vec![
            EffectSize::from_variance(0.5, 0.04),
            EffectSize::from_variance(0.5, 0.02),
            EffectSize::from_variance(0.5, 0.05),
        ];
        let fixed = meta_analyze(&homogeneous, ModelType::Fixed).unwrap();
        let random = meta_analyze(&homogeneous, ModelType::Random).unwrap();
        assert_eq!(random.model, ModelType::Random);
        assert_eq!(random.model_used, ModelType::Fixed);
        assert!((fixed.estimate - random.estimate).abs() < f64::EPSILON);
        assert!((fixed.se - random.se).abs() < f64::EPSILON);
        assert_eq!(fixed.weights(), random.weights());
    }

    #[test]
    fn test_exponentiated() {
        let r = meta_analyze(&[EffectSize::from_variance(0.0, 0.01)], ModelType::Fixed).unwrap();
        let (ratio, ci) = r.exponentiated();
        assert!((ratio - 1.0).abs() < 1e-12);
        assert!(ci.lower < 1.0 && ci.upper > 1.0);
    }

    #[test]
    fn test_result_json_field_names() {
        let r = meta_analyze(&effects(), ModelType::Random).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert!(json["heterogeneity"]["Q"].is_number());
        assert!(json["heterogeneity"]["I2"].is_number());
        assert_eq!(json["modelUsed"], "random");
        assert!(json["studies"][0]["weight"].is_number());
    }
}
