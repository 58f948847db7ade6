//! Funnel-plot coordinates for small-study effect inspection
//!
//! Produces the numbers only: each study's estimate against its precision
//! `1/se`, the pooled estimate the funnel is centred on, and the pseudo 95%
//! limits at any SE. Drawing is left to the caller.

use serde::{Deserialize, Serialize};

use super::meta_analyze;
use crate::config::ModelType;
use crate::effect::EffectSize;
use crate::transform::{confidence_interval, ConfidenceInterval};
use crate::Result;

/// One study on the funnel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelPoint {
    /// Effect estimate (x axis)
    pub estimate: f64,
    /// Standard error
    pub se: f64,
    /// `1 / se` (y axis)
    pub precision: f64,
}

/// Funnel-plot data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelData {
    /// Studies in input order
    pub points: Vec<FunnelPoint>,
    /// Pooled estimate the funnel is centred on
    pub pooled_estimate: f64,
}

impl FunnelData {
    /// Pseudo 95% limits `pooled ± 1.96·se` at a given SE
    #[must_use]
    pub fn limits_at(&self, se: f64) -> ConfidenceInterval {
        confidence_interval(self.pooled_estimate, se)
    }

    /// Points lying outside the pseudo 95% limits at their own SE
    #[must_use]
    pub fn outside_limits(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| !self.limits_at(p.se).contains(p.estimate))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Build funnel coordinates, centred on the pooled estimate under `model`.
///
/// # Errors
///
/// Whatever [`meta_analyze`] reports for `effects`.
pub fn funnel_plot_data(effects: &[EffectSize], model: ModelType) -> Result<FunnelData> {
    let pooled = meta_analyze(effects, model)?;
    let points = effects
        .iter()
        .map(|e| FunnelPoint {
            estimate: e.estimate,
            se: e.se,
            precision: 1.0 / e.se,
        })
        .collect();
    Ok(FunnelData {
        points,
        pooled_estimate: pooled.estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_is_inverse_se() {
        let effects = [
            EffectSize::from_se(0.2, 0.1),
            EffectSize::from_se(0.4, 0.25),
        ];
        let data = funnel_plot_data(&effects, ModelType::Fixed).unwrap();
        assert!((data.points[0].precision - 10.0).abs() < 1e-12);
        assert!((data.points[1].precision - 4.0).abs() < 1e-12);
        assert!(data.pooled_estimate > 0.2 && data.pooled_estimate < 0.4);
    }

    #[test]
    fn test_outlier_detected() {
        let effects = [
            EffectSize::from_se(0.0, 0.3),
            EffectSize::from_se(0.1, 0.3),
            EffectSize::from_se(-0.1, 0.3),
            EffectSize::from_se(1.5, 0.3),
        ];
        let data = funnel_plot_data(&effects, ModelType::Fixed).unwrap();
        assert_eq!(data.outside_limits(), vec![3]);
    }
}
