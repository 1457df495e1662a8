//! Nadaraya-Watson kernel regression over the close.
//!
//! Each estimate is a weighted mean of the `lookback + 1` most recent closes
//! (`b = 0..=lookback` bars back):
//! - rational quadratic: `w(b) = (1 + b^2 / (lookback^2 * 2 * r))^(-r)`
//! - gaussian:           `w(b) = exp(-b^2 / (2 * (lookback - lag)^2))`
//!
//! The curves are `lookback` shorter than the input. The derived booleans
//! look one and two bars back, so every array in [`KernelSignals`] is
//! `lookback + 2` shorter than the input.

use tracing::debug;

use crate::domain::{tail, Candles};
use crate::settings::KernelSettings;

/// Bars of history the slope-change booleans need beyond the curves.
pub const KERNEL_SHIFT: usize = 2;

/// Weighted mean of the trailing `lookback + 1` values for every bar that
/// has a full window.
fn kernel_estimate(src: &[f64], lookback: usize, weight: impl Fn(f64) -> f64) -> Vec<f64> {
    if src.len() <= lookback {
        return Vec::new();
    }
    let weights: Vec<f64> = (0..=lookback).map(|b| weight(b as f64)).collect();
    (lookback..src.len())
        .map(|t| {
            let mut numerator = 0.0;
            let mut denominator = 0.0;
            for (b, w) in weights.iter().enumerate() {
                numerator += src[t - b] * w;
                denominator += w;
            }
            numerator / denominator
        })
        .collect()
}

/// Rational quadratic kernel estimate.
pub fn rational_quadratic(src: &[f64], lookback: usize, relative_weighting: f64) -> Vec<f64> {
    let scale = (lookback * lookback) as f64 * 2.0 * relative_weighting;
    kernel_estimate(src, lookback, |b| {
        (1.0 + b * b / scale).powf(-relative_weighting)
    })
}

/// Gaussian kernel estimate with bandwidth `lookback - lag`.
pub fn gaussian(src: &[f64], lookback: usize, lag: usize) -> Vec<f64> {
    let bandwidth = lookback.saturating_sub(lag) as f64;
    kernel_estimate(src, lookback, |b| (-(b * b) / (2.0 * bandwidth * bandwidth)).exp())
}

/// `a` crosses above `b` at t: `a[t] > b[t] && a[t-1] <= b[t-1]`.
fn crossover(a: &[f64], b: &[f64], t: usize) -> bool {
    a[t] > b[t] && a[t - 1] <= b[t - 1]
}

fn crossunder(a: &[f64], b: &[f64], t: usize) -> bool {
    a[t] < b[t] && a[t - 1] >= b[t - 1]
}

/// Both curves and every boolean derived from them, tail-aligned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KernelSignals {
    pub rational_quadratic: Vec<f64>,
    pub gaussian: Vec<f64>,
    pub bullish_rate: Vec<bool>,
    pub bearish_rate: Vec<bool>,
    pub bullish_change: Vec<bool>,
    pub bearish_change: Vec<bool>,
    pub bullish_crossover: Vec<bool>,
    pub bearish_crossover: Vec<bool>,
    pub bullish_smooth: Vec<bool>,
    pub bearish_smooth: Vec<bool>,
    /// Kernel trend gate used by the state machine.
    pub is_bullish: Vec<bool>,
    pub is_bearish: Vec<bool>,
}

impl KernelSignals {
    pub fn build(settings: &KernelSettings, candles: &Candles) -> Self {
        let close = candles.close();
        let rq = rational_quadratic(
            close,
            settings.lookback_window,
            settings.relative_weighting,
        );
        let gauss = gaussian(close, settings.lookback_window, settings.lag);
        let signals = Self::from_curves(&rq, &gauss, settings);
        debug!(len = signals.len(), "kernel regression built");
        signals
    }

    /// Derive the booleans from two equally long curves.
    pub fn from_curves(rq: &[f64], gauss: &[f64], settings: &KernelSettings) -> Self {
        let m = rq.len().min(gauss.len());
        if m <= KERNEL_SHIFT {
            return Self::default();
        }
        let (rq, gauss) = (tail(rq, m), tail(gauss, m));

        let mut out = Self::default();
        for t in KERNEL_SHIFT..m {
            let bullish_rate = rq[t - 1] < rq[t];
            let bearish_rate = rq[t - 1] > rq[t];
            let was_bullish_rate = rq[t - 2] < rq[t - 1];
            let was_bearish_rate = rq[t - 2] > rq[t - 1];
            let bullish_smooth = gauss[t] >= rq[t];
            let bearish_smooth = gauss[t] <= rq[t];

            out.bullish_rate.push(bullish_rate);
            out.bearish_rate.push(bearish_rate);
            out.bullish_change.push(bullish_rate && was_bearish_rate);
            out.bearish_change.push(bearish_rate && was_bullish_rate);
            out.bullish_crossover.push(crossover(gauss, rq, t));
            out.bearish_crossover.push(crossunder(gauss, rq, t));
            out.bullish_smooth.push(bullish_smooth);
            out.bearish_smooth.push(bearish_smooth);

            let (is_bullish, is_bearish) = match (settings.use_kernel_filter, settings.use_kernel_smoothing) {
                (false, _) => (true, true),
                (true, true) => (bullish_smooth, bearish_smooth),
                (true, false) => (bullish_rate, bearish_rate),
            };
            out.is_bullish.push(is_bullish);
            out.is_bearish.push(is_bearish);
        }
        out.rational_quadratic = rq[KERNEL_SHIFT..].to_vec();
        out.gaussian = gauss[KERNEL_SHIFT..].to_vec();
        out
    }

    pub fn len(&self) -> usize {
        self.is_bullish.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_bullish.is_empty()
    }

    /// Keep the trailing `len` entries of every array.
    pub fn truncate_front(&mut self, len: usize) {
        fn keep<T>(series: &mut Vec<T>, len: usize) {
            let drop = series.len().saturating_sub(len);
            series.drain(..drop);
        }
        keep(&mut self.rational_quadratic, len);
        keep(&mut self.gaussian, len);
        for series in [
            &mut self.bullish_rate,
            &mut self.bearish_rate,
            &mut self.bullish_change,
            &mut self.bearish_change,
            &mut self.bullish_crossover,
            &mut self.bearish_crossover,
            &mut self.bullish_smooth,
            &mut self.bearish_smooth,
            &mut self.is_bullish,
            &mut self.is_bearish,
        ] {
            keep(series, len);
        }
    }
}

/// Leading candles consumed before the first kernel signal.
pub fn kernel_lookback(settings: &KernelSettings) -> usize {
    settings.lookback_window + KERNEL_SHIFT
}
