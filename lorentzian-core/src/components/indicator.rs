//! Indicator trait and the feature array container.
//!
//! Indicators are pure functions: candle window in, numeric series out.
//! Features are computed once per settings/candle window and then read by
//! index during classification. No recomputation per candle.

use crate::domain::{tail, Candles};

/// Trait for indicators.
///
/// Output length is `candles.len() - lookback()` (empty when the window is
/// shorter than the lookback); element `k` belongs to candle `k + lookback()`.
///
/// # Look-ahead contamination guard
/// No value for candle t may depend on price data from candle t+1 or later.
/// Window-normalized features break this and are not indicators; see
/// [`Feature::causal`](super::feature::Feature::causal).
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "adx_20").
    fn name(&self) -> &str;

    /// Number of leading candles consumed before the first output value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle window.
    fn compute(&self, candles: &Candles) -> Vec<f64>;
}

/// Ordered, tail-aligned feature series.
///
/// Every series has the same length; index `k` of each refers to the same
/// candle. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureArrays {
    names: Vec<String>,
    series: Vec<Vec<f64>>,
}

impl FeatureArrays {
    /// Tail-align the given named series.
    pub fn from_series(named: Vec<(String, Vec<f64>)>) -> Self {
        let len = named.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
        let (names, series) = named
            .into_iter()
            .map(|(name, s)| (name, tail(&s, len).to_vec()))
            .unzip();
        Self { names, series }
    }

    /// Number of candles covered.
    pub fn len(&self) -> usize {
        self.series.first().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of features.
    pub fn feature_count(&self) -> usize {
        self.series.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Value of feature `feature` at candle `index`.
    pub fn get(&self, feature: usize, index: usize) -> Option<f64> {
        self.series.get(feature).and_then(|s| s.get(index).copied())
    }

    /// Full series of one feature.
    pub fn get_series(&self, feature: usize) -> Option<&[f64]> {
        self.series.get(feature).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.series.iter().map(|s| s.as_slice())
    }

    /// Keep only the trailing `len` candles of every feature.
    pub fn truncate_front(&mut self, len: usize) {
        for s in &mut self.series {
            let drop = s.len().saturating_sub(len);
            s.drain(..drop);
        }
    }
}
