//! Criterion benchmarks for the classification hot paths.
//!
//! Benchmarks:
//! 1. Feature build (five default features over one window)
//! 2. Neighbor search (every aligned candle, default settings)
//! 3. Full pipeline run
//! 4. Parallel registry rebuild of many contexts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lorentzian_core::components::{build_features, classify_all, generate_labels};
use lorentzian_core::domain::tail;
use lorentzian_core::{
    Candle, Candles, ContextKey, ContextRegistry, LorentzianConfig, Pipeline, Settings,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize, phase: f64) -> Candles {
    let rows: Vec<Candle> = (0..n)
        .map(|i| {
            let t = i as f64 + phase;
            let close = 100.0 + (t * 0.1).sin() * 10.0 + (t * 0.037).cos() * 4.0;
            let open = close - 0.3;
            Candle {
                time: i as f64 * 60.0,
                open,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect();
    Candles::from_candles(&rows)
}

/// Defaults with a classifier window every benchmarked size can fill.
fn default_settings() -> Settings {
    let mut config = LorentzianConfig::default();
    config.general.max_bars_back = 500;
    Settings::from_config(&config).expect("default settings are valid")
}

// ── 1. Features ──────────────────────────────────────────────────────

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_build");
    let settings = default_settings();

    for &candle_count in &[500, 2000, 5000] {
        let candles = make_candles(candle_count, 0.0);
        group.bench_with_input(
            BenchmarkId::from_parameter(candle_count),
            &candles,
            |b, candles| b.iter(|| build_features(black_box(settings.features()), candles)),
        );
    }
    group.finish();
}

// ── 2. Neighbor search ───────────────────────────────────────────────

fn bench_classifier(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_search");
    group.sample_size(20);
    let settings = default_settings();

    for &candle_count in &[500, 2000] {
        let candles = make_candles(candle_count, 0.0);
        let features = build_features(settings.features(), &candles);
        let labels = generate_labels(settings.labels(), &candles);
        let labels = tail(&labels, features.len()).to_vec();
        group.bench_with_input(
            BenchmarkId::from_parameter(candle_count),
            &(features, labels),
            |b, (features, labels)| {
                b.iter(|| classify_all(settings.classification(), features, labels))
            },
        );
    }
    group.finish();
}

// ── 3. Pipeline ──────────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_run");
    group.sample_size(20);
    let pipeline = Pipeline::new(default_settings());

    for &candle_count in &[500, 2000] {
        let candles = make_candles(candle_count, 0.0);
        group.bench_with_input(
            BenchmarkId::from_parameter(candle_count),
            &candles,
            |b, candles| b.iter(|| pipeline.run(black_box(candles)).expect("pipeline run")),
        );
    }
    group.finish();
}

// ── 4. Registry ──────────────────────────────────────────────────────

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_rebuild_all");
    group.sample_size(10);

    let inputs: Vec<(ContextKey, Candles)> = (0..16)
        .map(|i| {
            (
                ContextKey::new(format!("SYM{i}"), "1h"),
                make_candles(1000, i as f64 * 7.0),
            )
        })
        .collect();

    group.bench_function("16_contexts_1000_candles", |b| {
        b.iter(|| {
            let mut registry = ContextRegistry::new(default_settings());
            black_box(registry.rebuild_all(&inputs))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_features,
    bench_classifier,
    bench_pipeline,
    bench_registry
);
criterion_main!(benches);
