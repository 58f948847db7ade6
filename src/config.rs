//! Analysis configuration
//!
//! Every choice a caller can make (effect measure, pooling model, proportion
//! transform) is a plain enumerated value carried in [`AnalysisConfig`] and
//! passed into each call. Nothing here is global.

use serde::{Deserialize, Serialize};

/// Effect measure for continuous (two-arm mean/SD/n) studies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousMeasure {
    /// Raw mean difference, unpooled (Welch-type) variance
    #[default]
    #[serde(rename = "MD")]
    MeanDifference,
    /// Cohen's d with the large-sample variance approximation
    #[serde(rename = "SMD")]
    StandardizedMeanDifference,
}

/// Effect measure for binary (2x2) studies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryMeasure {
    /// Natural log of the risk ratio
    #[default]
    #[serde(rename = "RR")]
    LogRiskRatio,
    /// Natural log of the odds ratio
    #[serde(rename = "OR")]
    LogOddsRatio,
}

/// Pooling model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    /// One true effect, inverse-variance weights
    Fixed,
    /// DerSimonian-Laird between-study variance added to each study variance
    #[default]
    Random,
}

/// Variance-stabilizing transform applied to single-arm proportions before pooling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProportionTransform {
    /// Raw proportion, binomial SE
    #[default]
    None,
    /// Log-odds
    Logit,
    /// Freeman-Tukey double arcsine
    FreemanTukey,
    /// asin(sqrt(p))
    Arcsine,
}

impl ProportionTransform {
    /// Short label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Logit => "logit",
            Self::FreemanTukey => "freeman-tukey",
            Self::Arcsine => "arcsine",
        }
    }
}

/// Per-call analysis settings.
///
/// ```rust
/// use metastat::config::{AnalysisConfig, ModelType, ProportionTransform};
///
/// let config = AnalysisConfig::builder()
///     .model(ModelType::Fixed)
///     .proportion_transform(ProportionTransform::Logit)
///     .build();
/// assert_eq!(config.model, ModelType::Fixed);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Measure for continuous studies
    pub continuous_measure: ContinuousMeasure,
    /// Measure for binary studies
    pub binary_measure: BinaryMeasure,
    /// Pooling model
    pub model: ModelType,
    /// Transform for proportion studies
    pub proportion_transform: ProportionTransform,
}

impl AnalysisConfig {
    /// Create a config builder starting from the defaults
    #[must_use]
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

/// Builder for [`AnalysisConfig`]
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Set the continuous-outcome measure
    #[must_use]
    pub const fn continuous_measure(mut self, measure: ContinuousMeasure) -> Self {
        self.config.continuous_measure = measure;
        self
    }

    /// Set the binary-outcome measure
    #[must_use]
    pub const fn binary_measure(mut self, measure: BinaryMeasure) -> Self {
        self.config.binary_measure = measure;
        self
    }

    /// Set the pooling model
    #[must_use]
    pub const fn model(mut self, model: ModelType) -> Self {
        self.config.model = model;
        self
    }

    /// Set the proportion transform
    #[must_use]
    pub const fn proportion_transform(mut self, transform: ProportionTransform) -> Self {
        self.config.proportion_transform = transform;
        self
    }

    /// Build the config
    #[must_use]
    pub const fn build(self) -> AnalysisConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tool_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.continuous_measure, ContinuousMeasure::MeanDifference);
        assert_eq!(config.binary_measure, BinaryMeasure::LogRiskRatio);
        assert_eq!(config.model, ModelType::Random);
        assert_eq!(config.proportion_transform, ProportionTransform::None);
    }

    #[test]
    fn test_builder_sets_every_field() {
        let config = AnalysisConfig::builder()
            .continuous_measure(ContinuousMeasure::StandardizedMeanDifference)
            .binary_measure(BinaryMeasure::LogOddsRatio)
            .model(ModelType::Fixed)
            .proportion_transform(ProportionTransform::FreemanTukey)
            .build();
        assert_eq!(
            config.continuous_measure,
            ContinuousMeasure::StandardizedMeanDifference
        );
        assert_eq!(config.binary_measure, BinaryMeasure::LogOddsRatio);
        assert_eq!(config.model, ModelType::Fixed);
        assert_eq!(config.proportion_transform, ProportionTransform::FreemanTukey);
    }

    #[test]
    fn test_config_json_names() {
        let json = r#"{
            "model": "fixed",
            "proportionTransform": "freeman-tukey",
            "continuousMeasure": "SMD"
        }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.model, ModelType::Fixed);
        assert_eq!(config.proportion_transform, ProportionTransform::FreemanTukey);
        assert_eq!(
            config.continuous_measure,
            ContinuousMeasure::StandardizedMeanDifference
        );
        // omitted field falls back to default
        assert_eq!(config.binary_measure, BinaryMeasure::LogRiskRatio);
    }

    #[test]
    fn test_transform_labels() {
        assert_eq!(ProportionTransform::FreemanTukey.label(), "freeman-tukey");
        assert_eq!(ProportionTransform::None.label(), "none");
    }
}
