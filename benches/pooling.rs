//! Pooling benchmarks
//!
//! Effect-size computation, fixed/random pooling and meta-regression over
//! random study sets of increasing size.
//!
//! Run with: cargo bench --bench pooling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use metastat::config::{AnalysisConfig, ModelType};
use metastat::effect::{compute_effects, EffectSize};
use metastat::pooling::meta_analyze;
use metastat::regression::fit_meta_regression;
use metastat::study::{BinaryArm, Study};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 3] = [10, 1_000, 100_000];

fn random_binary_studies(k: usize, seed: u64) -> Vec<Study> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..k)
        .map(|_| {
            let nt = rng.gen_range(50..500);
            let nc = rng.gen_range(50..500);
            Study::binary(
                BinaryArm::new(rng.gen_range(0..=nt / 4), nt),
                BinaryArm::new(rng.gen_range(0..=nc / 3), nc),
            )
        })
        .collect()
}

fn random_effects(k: usize, seed: u64) -> Vec<EffectSize> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..k)
        .map(|_| EffectSize::from_se(rng.gen_range(-1.0..1.0), rng.gen_range(0.05..0.5)))
        .collect()
}

/// Benchmark log RR computation for whole study sets
fn bench_effect_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("effect_sizes_log_rr");
    let config = AnalysisConfig::default();

    for k in SIZES {
        let studies = random_binary_studies(k, 42);
        group.bench_with_input(BenchmarkId::from_parameter(k), &studies, |b, studies| {
            b.iter(|| compute_effects(black_box(studies), &config));
        });
    }

    group.finish();
}

/// Benchmark fixed- vs random-effects pooling
fn bench_meta_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("meta_analyze");

    for k in SIZES {
        let effects = random_effects(k, 7);
        group.bench_with_input(BenchmarkId::new("fixed", k), &effects, |b, effects| {
            b.iter(|| meta_analyze(black_box(effects), ModelType::Fixed));
        });
        group.bench_with_input(BenchmarkId::new("random", k), &effects, |b, effects| {
            b.iter(|| meta_analyze(black_box(effects), ModelType::Random));
        });
    }

    group.finish();
}

/// Benchmark single-covariate meta-regression
fn bench_meta_regression(c: &mut Criterion) {
    let mut group = c.benchmark_group("meta_regression");

    for k in SIZES {
        let effects = random_effects(k, 11);
        let mut rng = StdRng::seed_from_u64(13);
        let covariate: Vec<f64> = (0..k).map(|_| rng.gen_range(0.1..0.4)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(k), &effects, |b, effects| {
            b.iter(|| fit_meta_regression(black_box(effects), black_box(&covariate)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_effect_sizes, bench_meta_analyze, bench_meta_regression);
criterion_main!(benches);
