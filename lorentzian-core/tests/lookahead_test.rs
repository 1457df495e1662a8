//! Look-ahead contamination tests for the indicator primitives.
//!
//! Invariant: no value for candle t may depend on price data from candle t+1
//! or later.
//!
//! Method: compute on a truncated window (candles 0..150) and on the full
//! window (candles 0..300). Outputs are trimmed from the front, so output
//! index k refers to the same candle in both runs. Assert the overlapping
//! outputs are identical.

mod common;

use lorentzian_core::components::feature::Feature;
use lorentzian_core::components::filter::{kalman_slope, AdxFilter, CandleFilter, VolatilityFilter};
use lorentzian_core::components::indicator::Indicator;
use lorentzian_core::components::kernel::{gaussian, rational_quadratic};
use lorentzian_core::indicators::*;
use lorentzian_core::settings::{FeatureKind, FeatureSpec};
use lorentzian_core::Candles;

const TRUNCATED: usize = 150;
const FULL: usize = 300;

fn assert_prefix_equal(name: &str, truncated: &[f64], full: &[f64]) {
    assert!(!truncated.is_empty(), "{name}: empty truncated output");
    assert!(truncated.len() <= full.len(), "{name}: truncated output longer than full");
    for (k, (t, f)) in truncated.iter().zip(full).enumerate() {
        assert!(
            t == f || (t.is_nan() && f.is_nan()),
            "{name}: look-ahead at output {k} (truncated={t}, full={f})"
        );
    }
}

fn windows() -> (Candles, Candles) {
    let full = common::random_walk(FULL, 7);
    let truncated = full.first(TRUNCATED);
    (truncated, full)
}

fn check_series(name: &str, f: impl Fn(&Candles) -> Vec<f64>) {
    let (truncated, full) = windows();
    assert_prefix_equal(name, &f(&truncated), &f(&full));
}

#[test]
fn moving_averages() {
    check_series("ema", |c| ema(c.close(), 20));
    check_series("sma", |c| sma(c.close(), 20));
    check_series("rma", |c| rma(c.close(), 14));
}

#[test]
fn oscillators() {
    check_series("rsi", |c| rsi(c.close(), 14));
    check_series("cci", |c| cci(c.high(), c.low(), c.close(), 20));
    check_series("dx", |c| directional_movement_index(c.high(), c.low(), c.close(), 14));
    check_series("adx", |c| adx(c.high(), c.low(), c.close(), 14));
}

#[test]
fn ranges() {
    check_series("true_range", |c| true_range(c.high(), c.low(), c.close()));
    check_series("atr", |c| atr(c.high(), c.low(), c.close(), 10));
}

#[test]
fn kernel_curves() {
    check_series("rational_quadratic", |c| rational_quadratic(c.close(), 8, 8.0));
    check_series("gaussian", |c| gaussian(c.close(), 8, 2));
}

#[test]
fn regime_slope() {
    check_series("kalman_slope", |c| kalman_slope(&c.ohlc4(), c.high(), c.low()));
}

#[test]
fn indicator_trait_objects() {
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Ema::new(10)),
        Box::new(Sma::new(10)),
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Adx::new(14)),
    ];
    let (truncated, full) = windows();
    for indicator in &indicators {
        let t = indicator.compute(&truncated);
        let f = indicator.compute(&full);
        assert_eq!(t.len(), TRUNCATED - indicator.lookback(), "{}", indicator.name());
        assert_eq!(f.len(), FULL - indicator.lookback(), "{}", indicator.name());
        assert_prefix_equal(indicator.name(), &t, &f);
    }
}

#[test]
fn every_feature_offered_as_an_indicator_is_causal() {
    let (truncated, full) = windows();
    let mut offered = 0;
    for (kind, a, b) in [
        (FeatureKind::Rsi, 14, 1),
        (FeatureKind::WaveTrend, 10, 11),
        (FeatureKind::Cci, 20, 1),
        (FeatureKind::Adx, 20, 2),
        (FeatureKind::Rsi, 9, 1),
    ] {
        let spec = FeatureSpec {
            kind,
            param_a: a,
            param_b: b,
        };
        let Some(feature) = Feature::causal(spec) else {
            assert!(kind.is_window_normalized(), "{kind} refused");
            continue;
        };
        offered += 1;
        let t = feature.compute(&truncated);
        let f = feature.compute(&full);
        assert_eq!(t.len(), TRUNCATED - feature.lookback(), "{}", feature.name());
        assert_prefix_equal(feature.name(), &t, &f);
    }
    assert_eq!(offered, 3);
}

#[test]
fn filters() {
    let (truncated, full) = windows();
    let filters: Vec<Box<dyn CandleFilter>> = vec![
        Box::new(VolatilityFilter::default_params()),
        Box::new(AdxFilter::default_params()),
    ];
    for filter in &filters {
        let t = filter.evaluate(&truncated);
        let f = filter.evaluate(&full);
        assert_eq!(t[..], f[..t.len()], "{}", filter.name());
    }
}
