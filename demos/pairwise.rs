//! Pairwise meta-analysis walkthrough
//!
//! This example demonstrates:
//! - Loading a study set from JSON (or the bundled fixture)
//! - Effect sizes under each measure, fixed vs random pooling
//! - Meta-regression on a study-level covariate
//!
//! Run with: cargo run --example pairwise [-- path/to/studies.json]
//! Set `RUST_LOG=metastat=debug` to see the pooling trace.

use anyhow::Context;
use metastat::config::{AnalysisConfig, BinaryMeasure, ModelType};
use metastat::dataset::StudySet;
use metastat::transform::{format_number, format_p_value};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| {
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/binary.json").to_string()
    });
    let set = StudySet::from_path(&path).with_context(|| format!("loading {path}"))?;

    println!("=== Metastat Pairwise Example ===\n");
    println!(
        "Study set: {} ({} studies)\n",
        set.name.as_deref().unwrap_or("unnamed"),
        set.len()
    );

    for measure in [BinaryMeasure::LogRiskRatio, BinaryMeasure::LogOddsRatio] {
        let label = if measure == BinaryMeasure::LogRiskRatio { "RR" } else { "OR" };
        println!("--- {label} ---");
        for model in [ModelType::Fixed, ModelType::Random] {
            let config = AnalysisConfig::builder().binary_measure(measure).model(model).build();
            let result = set
                .analyze(&config)
                .with_context(|| format!("pooling with {config:?}"))?;
            let (ratio, ci) = result.exponentiated();
            println!(
                "  {:<6} {label} = {} [{}, {}]  p {}  (model used: {:?})",
                format!("{model:?}"),
                format_number(ratio, 2),
                format_number(ci.lower, 2),
                format_number(ci.upper, 2),
                format_p_value(result.p),
                result.model_used,
            );
            let h = result.heterogeneity;
            println!(
                "         Q = {} (df {}), p {}, I² = {}%, τ² = {}",
                format_number(h.q, 2),
                h.df,
                format_p_value(h.p),
                format_number(h.i2, 1),
                format_number(h.tau2, 4),
            );
        }
        println!();
    }

    println!("Per-study weights (random effects, log RR):");
    let result = set.analyze(&AnalysisConfig::default())?;
    for (study, effect) in set.iter().zip(&result.studies) {
        println!(
            "  {:<16} {:>7}  [{:>7}, {:>7}]  {:>5}%",
            study.name,
            format_number(effect.estimate, 3),
            format_number(effect.ci.lower, 3),
            format_number(effect.ci.upper, 3),
            format_number(effect.weight.unwrap_or(0.0), 1),
        );
    }
    println!();

    if set.iter().all(|s| s.covariates.contains_key("baselineRisk")) {
        let fit = set.meta_regression(&AnalysisConfig::default(), "baselineRisk")?;
        println!("Meta-regression on baselineRisk:");
        println!(
            "  slope = {} (SE {}, p {}), intercept = {}",
            format_number(fit.slope, 3),
            format_number(fit.slope_se, 3),
            format_p_value(fit.slope_p),
            format_number(fit.intercept, 3),
        );
        println!(
            "  Q_residual = {} (df {}), I²_residual = {}%",
            format_number(fit.q_residual, 2),
            fit.df_residual,
            format_number(fit.i2_residual, 1),
        );
    }

    Ok(())
}
