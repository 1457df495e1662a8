//! Feature series builder.
//!
//! Turns a `FeatureSpec` (indicator kind + two parameters) into one series
//! on a comparable [0, 1] scale:
//! - RSI: rescale(EMA(RSI(close, a), b), 0..100 → 0..1)
//! - WT:  normalize(wt1 - SMA(wt1, 4)) where wt1 = EMA(ci, b) and
//!        ci = (hlc3 - EMA(hlc3, a)) / (0.015 * EMA(|hlc3 - EMA(hlc3, a)|, a))
//! - CCI: normalize(EMA(CCI(close, close, close, a), b))
//! - ADX: rescale(ADX(a), 0..100 → 0..1); `b` is unused

use tracing::debug;

use crate::domain::{zip_with, Candles};
use crate::indicators::{adx, adx_lookback, cci, cci_lookback, ema, normalize, rescale_series, rsi, sma};
use crate::settings::{FeatureKind, FeatureSpec};

use super::indicator::{FeatureArrays, Indicator};

const WT_CI_CONSTANT: f64 = 0.015;
const WT_SIGNAL_PERIOD: usize = 4;

/// A configured feature with fixed output bounds, usable wherever an
/// `Indicator` is.
#[derive(Debug, Clone)]
pub struct Feature {
    spec: FeatureSpec,
    name: String,
}

impl Feature {
    /// `None` for window-normalized kinds (WT, CCI): their min-max scaling
    /// reads the extremes of the whole window, later candles included.
    pub fn causal(spec: FeatureSpec) -> Option<Self> {
        if spec.kind.is_window_normalized() {
            return None;
        }
        Some(Self {
            name: spec.name(),
            spec,
        })
    }

    pub fn spec(&self) -> FeatureSpec {
        self.spec
    }
}

impl Indicator for Feature {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        feature_lookback(&self.spec)
    }

    fn compute(&self, candles: &Candles) -> Vec<f64> {
        feature_series(&self.spec, candles)
    }
}

/// Leading candles a feature consumes before its first value.
pub fn feature_lookback(spec: &FeatureSpec) -> usize {
    match spec.kind {
        FeatureKind::Rsi => spec.param_a,
        // index 0 skipped for ci, then SMA(4)
        FeatureKind::WaveTrend => 1 + WT_SIGNAL_PERIOD - 1,
        FeatureKind::Cci => cci_lookback(spec.param_a),
        FeatureKind::Adx => adx_lookback(spec.param_a),
    }
}

/// Compute one normalized feature series.
pub fn feature_series(spec: &FeatureSpec, candles: &Candles) -> Vec<f64> {
    match spec.kind {
        FeatureKind::Rsi => rsi_feature(candles.close(), spec.param_a, spec.param_b),
        FeatureKind::WaveTrend => wave_trend_feature(&candles.hlc3(), spec.param_a, spec.param_b),
        FeatureKind::Cci => cci_feature(candles.close(), spec.param_a, spec.param_b),
        FeatureKind::Adx => adx_feature(candles, spec.param_a),
    }
}

fn rsi_feature(close: &[f64], length: usize, smoothing: usize) -> Vec<f64> {
    rescale_series(&ema(&rsi(close, length), smoothing), 0.0, 100.0, 0.0, 1.0)
}

fn wave_trend_feature(hlc3: &[f64], channel_length: usize, average_length: usize) -> Vec<f64> {
    let ema1 = ema(hlc3, channel_length);
    let deviation: Vec<f64> = hlc3.iter().zip(&ema1).map(|(h, e)| (h - e).abs()).collect();
    let ema2 = ema(&deviation, channel_length);

    let ci: Vec<f64> = (1..hlc3.len())
        .map(|i| {
            let denom = WT_CI_CONSTANT * ema2[i];
            if denom == 0.0 {
                0.0
            } else {
                (hlc3[i] - ema1[i]) / denom
            }
        })
        .collect();

    let wt1 = ema(&ci, average_length);
    let wt2 = sma(&wt1, WT_SIGNAL_PERIOD);
    normalize(&zip_with(&wt1, &wt2, |a, b| a - b))
}

fn cci_feature(close: &[f64], length: usize, smoothing: usize) -> Vec<f64> {
    normalize(&ema(&cci(close, close, close, length), smoothing))
}

fn adx_feature(candles: &Candles, length: usize) -> Vec<f64> {
    let values = adx(candles.high(), candles.low(), candles.close(), length);
    rescale_series(&values, 0.0, 100.0, 0.0, 1.0)
}

/// Build every configured feature and tail-align them.
pub fn build_features(specs: &[FeatureSpec], candles: &Candles) -> FeatureArrays {
    let named = specs
        .iter()
        .map(|spec| {
            let series = feature_series(spec, candles);
            debug!(feature = %spec.name(), len = series.len(), "feature built");
            (spec.name(), series)
        })
        .collect();
    FeatureArrays::from_series(named)
}
