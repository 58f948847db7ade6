//! Continuous-outcome measures

use super::EffectSize;
use crate::study::ContinuousStudy;

/// Mean difference, treatment minus control.
///
/// Variance is the unpooled (Welch-type) `sd1²/n1 + sd2²/n2`.
#[must_use]
pub fn mean_difference(study: &ContinuousStudy) -> EffectSize {
    let t = &study.treatment;
    let c = &study.control;
    let md = t.mean - c.mean;
    let variance = t.sd.powi(2) / f64::from(t.n) + c.sd.powi(2) / f64::from(c.n);
    EffectSize::from_variance(md, variance)
}

/// Pooled standard deviation `√[((n1-1)sd1² + (n2-1)sd2²) / (n1+n2-2)]`.
///
/// Division by zero when `n1 + n2 == 2`.
#[must_use]
pub fn pooled_sd(study: &ContinuousStudy) -> f64 {
    let t = &study.treatment;
    let c = &study.control;
    let n1 = f64::from(t.n);
    let n2 = f64::from(c.n);
    ((n1 - 1.0).mul_add(t.sd.powi(2), (n2 - 1.0) * c.sd.powi(2)) / (n1 + n2 - 2.0)).sqrt()
}

/// Cohen's d: mean difference over the pooled SD.
///
/// Variance uses the large-sample approximation
/// `(n1+n2)/(n1·n2) + d²/(2(n1+n2))`. No small-sample (Hedges' g) correction.
/// Callers must guard `n1 + n2 > 2`.
#[must_use]
pub fn standardized_mean_difference(study: &ContinuousStudy) -> EffectSize {
    let n1 = f64::from(study.treatment.n);
    let n2 = f64::from(study.control.n);
    let d = (study.treatment.mean - study.control.mean) / pooled_sd(study);
    let variance = (n1 + n2) / (n1 * n2) + d * d / (2.0 * (n1 + n2));
    EffectSize::from_variance(d, variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::study::ContinuousArm;

    fn study_a() -> ContinuousStudy {
        ContinuousStudy {
            treatment: ContinuousArm::new(130.0, 12.0, 150),
            control: ContinuousArm::new(136.0, 13.0, 145),
        }
    }

    #[test]
    fn test_mean_difference_hand_computed() {
        let es = mean_difference(&study_a());
        let variance = 144.0 / 150.0 + 169.0 / 145.0;
        assert!((es.estimate + 6.0).abs() < 1e-12);
        assert!((es.variance - variance).abs() < 1e-12);
        assert!((es.se - variance.sqrt()).abs() < 1e-12);
        assert!((es.ci.upper - (-6.0 + 1.96 * variance.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_pooled_sd_equal_arms() {
        let study = ContinuousStudy {
            treatment: ContinuousArm::new(0.0, 2.0, 10),
            control: ContinuousArm::new(0.0, 2.0, 30),
        };
        assert!((pooled_sd(&study) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_smd_hand_computed() {
        let study = study_a();
        let sp = ((149.0 * 144.0 + 144.0 * 169.0) / 293.0_f64).sqrt();
        let d = -6.0 / sp;
        let variance = 295.0 / (150.0 * 145.0) + d * d / (2.0 * 295.0);
        let es = standardized_mean_difference(&study);
        assert!((es.estimate - d).abs() < 1e-12);
        assert!((es.variance - variance).abs() < 1e-12);
    }

    #[test]
    fn test_smd_sign_follows_md() {
        let study = ContinuousStudy {
            treatment: ContinuousArm::new(10.0, 2.0, 20),
            control: ContinuousArm::new(8.0, 2.0, 20),
        };
        let es = standardized_mean_difference(&study);
        assert!((es.estimate - 1.0).abs() < 1e-12);
    }
}
