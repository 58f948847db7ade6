//! # Metastat: Meta-Analysis Statistics Core
//!
//! **Version**: 0.1.0
//!
//! Metastat turns study-level data (continuous, binary, proportion and
//! diagnostic-accuracy counts) into effect sizes, pools them with fixed- and
//! random-effects inverse-variance meta-analysis, reports heterogeneity, fits
//! a weighted meta-regression on one covariate, and summarizes diagnostic
//! accuracy.
//!
//! ## Design Principles
//!
//! - **Pure functions**: every computation takes immutable input and returns
//!   a fresh value; there is no global state
//! - **Validate at the boundary**: raw formulas are total, the entry points
//!   ([`effect::compute_effect`], [`pooling::meta_analyze`], ...) reject
//!   invalid studies with [`Error::InvalidStudyData`]
//! - **Documented degradations**: τ² = 0 turns random-effects into
//!   fixed-effect, k = 1 gives Q = I² = τ² = 0, a two-study regression
//!   reports residual I² of 0
//! - **Approximate distributions**: the normal and χ² CDFs are closed-form
//!   approximations (see [`distribution`])
//!
//! ## Example Usage
//!
//! ```rust
//! use metastat::config::AnalysisConfig;
//! use metastat::effect::compute_effects;
//! use metastat::pooling::meta_analyze;
//! use metastat::study::{ContinuousArm, Study};
//!
//! let studies = [
//!     Study::continuous(
//!         ContinuousArm::new(128.5, 12.3, 150),
//!         ContinuousArm::new(135.2, 13.1, 145),
//!     ),
//!     Study::continuous(
//!         ContinuousArm::new(130.1, 11.8, 200),
//!         ContinuousArm::new(136.8, 12.5, 198),
//!     ),
//! ];
//! let config = AnalysisConfig::default();
//! let effects = compute_effects(&studies, &config)?;
//! let result = meta_analyze(&effects, config.model)?;
//! println!("MD = {:.2} [{:.2}, {:.2}]", result.estimate, result.ci.lower, result.ci.upper);
//! # Ok::<(), metastat::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod dataset;
pub mod diagnostic;
pub mod distribution;
pub mod effect;
pub mod error;
pub mod pooling;
pub mod regression;
pub mod study;
pub mod transform;

pub use config::{AnalysisConfig, BinaryMeasure, ContinuousMeasure, ModelType, ProportionTransform};
pub use effect::EffectSize;
pub use error::{Error, Result};
pub use pooling::MetaAnalysisResult;
pub use regression::MetaRegressionResult;
pub use study::Study;
