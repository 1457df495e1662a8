//! ADX filter - gates signals by trend strength.
//!
//! Passes where ADX > threshold (a trending market). The previous candle
//! used for directional movement is always `index - 1`.

use crate::domain::Candles;
use crate::indicators::{adx, adx_lookback};

use super::CandleFilter;

#[derive(Debug, Clone)]
pub struct AdxFilter {
    pub enabled: bool,
    pub length: usize,
    pub threshold: f64,
}

impl AdxFilter {
    pub fn new(enabled: bool, length: usize, threshold: f64) -> Self {
        assert!(length >= 1, "length must be >= 1");
        Self {
            enabled,
            length,
            threshold,
        }
    }

    pub fn default_params() -> Self {
        Self::new(true, 14, 20.0)
    }
}

impl CandleFilter for AdxFilter {
    fn name(&self) -> &str {
        "adx_filter"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn lookback(&self) -> usize {
        adx_lookback(self.length)
    }

    fn compute(&self, candles: &Candles) -> Vec<bool> {
        adx(candles.high(), candles.low(), candles.close(), self.length)
            .into_iter()
            .map(|v| v > self.threshold)
            .collect()
    }
}
