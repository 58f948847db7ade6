//! Named study collections loaded from JSON
//!
//! A [`StudySet`] is the input side of the library: an ordered list of
//! identified studies plus any study-level covariates. Every helper validates
//! studies under their own names, so errors read `Invalid study data in
//! 'Chen 2020'` rather than a position.
//!
//! ```json
//! {
//!   "name": "Blood pressure",
//!   "studies": [
//!     {
//!       "id": "cont-1",
//!       "name": "Smith 2018",
//!       "year": 2018,
//!       "covariates": { "baselineRisk": 0.15 },
//!       "study": {
//!         "type": "continuous",
//!         "treatment": { "mean": 128.5, "sd": 12.3, "n": 150 },
//!         "control": { "mean": 135.2, "sd": 13.1, "n": 145 }
//!       }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::diagnostic::{summarize_diagnostic, DiagnosticSummary};
use crate::effect::{compute_effect, EffectSize};
use crate::pooling::{meta_analyze, pool_proportions, MetaAnalysisResult, ProportionPoolResult};
use crate::regression::{fit_meta_regression, MetaRegressionResult};
use crate::study::{DiagnosticStudy, ProportionStudy, Study};
use crate::{Error, Result};

/// One identified study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStudy {
    /// Stable identifier
    pub id: String,
    /// Display name, used as the label in errors
    pub name: String,
    /// Publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// First author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Study-level covariates for meta-regression
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub covariates: BTreeMap<String, f64>,
    /// Outcome data
    pub study: Study,
}

impl NamedStudy {
    /// Study without year, author or covariates
    pub fn new(id: impl Into<String>, name: impl Into<String>, study: impl Into<Study>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            year: None,
            author: None,
            covariates: BTreeMap::new(),
            study: study.into(),
        }
    }

    /// Attach a covariate value
    #[must_use]
    pub fn with_covariate(mut self, name: impl Into<String>, value: f64) -> Self {
        self.covariates.insert(name.into(), value);
        self
    }
}

/// Ordered collection of studies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySet {
    /// Collection name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Studies in analysis order
    pub studies: Vec<NamedStudy>,
}

impl StudySet {
    /// Wrap studies into an unnamed set
    #[must_use]
    pub const fn new(studies: Vec<NamedStudy>) -> Self {
        Self { name: None, studies }
    }

    /// Parse a set from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] on malformed input or an unknown study `type`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        debug!(k = set.len(), name = ?set.name, "loaded study set");
        Ok(set)
    }

    /// Read and parse a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file can't be read, [`Error::Json`] if it
    /// doesn't parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of studies
    #[must_use]
    pub fn len(&self) -> usize {
        self.studies.len()
    }

    /// Whether the set holds no studies
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.studies.is_empty()
    }

    /// Iterate over the studies
    pub fn iter(&self) -> std::slice::Iter<'_, NamedStudy> {
        self.studies.iter()
    }

    /// Validate every study under its name
    ///
    /// # Errors
    ///
    /// The first [`Error::InvalidStudyData`] found.
    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(|s| s.study.validate(&s.name))
    }

    /// Effect size of every study under `config`, in order
    ///
    /// # Errors
    ///
    /// See [`compute_effect`].
    pub fn effect_sizes(&self, config: &AnalysisConfig) -> Result<Vec<EffectSize>> {
        self.iter()
            .map(|s| compute_effect(&s.study, config, &s.name))
            .collect()
    }

    /// Pool the set's effect sizes with `config.model`
    ///
    /// # Errors
    ///
    /// See [`compute_effect`] and [`meta_analyze`].
    pub fn analyze(&self, config: &AnalysisConfig) -> Result<MetaAnalysisResult> {
        meta_analyze(&self.effect_sizes(config)?, config.model)
    }

    /// Covariate values in study order
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStudyData`] naming the first study without the
    /// covariate.
    pub fn covariate(&self, name: &str) -> Result<Vec<f64>> {
        self.iter()
            .map(|s| {
                s.covariates.get(name).copied().ok_or_else(|| {
                    Error::invalid_study(&s.name, format!("missing covariate '{name}'"))
                })
            })
            .collect()
    }

    /// Regress the set's effect sizes on a named covariate
    ///
    /// # Errors
    ///
    /// See [`StudySet::covariate`], [`compute_effect`] and
    /// [`fit_meta_regression`].
    pub fn meta_regression(
        &self,
        config: &AnalysisConfig,
        covariate: &str,
    ) -> Result<MetaRegressionResult> {
        let x = self.covariate(covariate)?;
        fit_meta_regression(&self.effect_sizes(config)?, &x)
    }

    /// Diagnostic counts of every study
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeasureMismatch`] if any study is not diagnostic, or
    /// [`Error::InvalidStudyData`] if one has an undefined rate.
    pub fn diagnostic_counts(&self) -> Result<Vec<DiagnosticStudy>> {
        self.iter()
            .map(|s| {
                s.study.validate(&s.name)?;
                s.study.as_diagnostic().copied()
            })
            .collect()
    }

    /// Unweighted sensitivity/specificity summary
    ///
    /// # Errors
    ///
    /// See [`StudySet::diagnostic_counts`] and [`summarize_diagnostic`].
    pub fn diagnostic_summary(&self) -> Result<DiagnosticSummary> {
        summarize_diagnostic(&self.diagnostic_counts()?)
    }

    /// Single-arm proportions of every study
    ///
    /// # Errors
    ///
    /// Returns [`Error::MeasureMismatch`] if any study is not a proportion.
    pub fn proportion_counts(&self) -> Result<Vec<ProportionStudy>> {
        self.iter()
            .map(|s| {
                s.study.validate(&s.name)?;
                s.study.as_proportion().copied()
            })
            .collect()
    }

    /// Pool the set's proportions with `config.proportion_transform`
    ///
    /// # Errors
    ///
    /// See [`StudySet::proportion_counts`] and [`pool_proportions`].
    pub fn pool_proportions(&self, config: &AnalysisConfig) -> Result<ProportionPoolResult> {
        pool_proportions(&self.proportion_counts()?, config.proportion_transform)
    }
}

impl<'a> IntoIterator for &'a StudySet {
    type Item = &'a NamedStudy;
    type IntoIter = std::slice::Iter<'a, NamedStudy>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<NamedStudy> for StudySet {
    fn from_iter<I: IntoIterator<Item = NamedStudy>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
