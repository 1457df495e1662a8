//! Volatility filter - passes when short-term ATR exceeds long-term ATR.
//!
//! A rising short ATR relative to the long ATR marks an expanding range,
//! which is when the classifier's signals are allowed through.

use crate::domain::{zip_with, Candles};
use crate::indicators::atr;

use super::CandleFilter;

/// ATR expansion filter: `ATR(min_length) > ATR(max_length)`.
#[derive(Debug, Clone)]
pub struct VolatilityFilter {
    pub enabled: bool,
    pub min_length: usize,
    pub max_length: usize,
}

impl VolatilityFilter {
    pub fn new(enabled: bool, min_length: usize, max_length: usize) -> Self {
        assert!(min_length >= 1 && max_length >= 1, "ATR lengths must be >= 1");
        Self {
            enabled,
            min_length,
            max_length,
        }
    }

    pub fn default_params() -> Self {
        Self::new(true, 1, 10)
    }
}

impl CandleFilter for VolatilityFilter {
    fn name(&self) -> &str {
        "volatility_filter"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn lookback(&self) -> usize {
        self.min_length.max(self.max_length) - 1
    }

    fn compute(&self, candles: &Candles) -> Vec<bool> {
        let (high, low, close) = (candles.high(), candles.low(), candles.close());
        let recent = atr(high, low, close, self.min_length);
        let historical = atr(high, low, close, self.max_length);
        zip_with(&recent, &historical, |r, h| r > h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_candles;

    #[test]
    fn passes_on_range_expansion() {
        // Quiet candles with a 2-point range, then one wide candle.
        let mut data: Vec<_> = (0..12).map(|_| (100.0, 101.0, 99.0, 100.0)).collect();
        data.push((100.0, 110.0, 90.0, 100.0));
        let candles = make_ohlc_candles(&data);
        let result = VolatilityFilter::default_params().evaluate(&candles);
        assert_eq!(result.len(), 13 - 9);
        assert_eq!(result, vec![false, false, false, true]);
    }

    #[test]
    fn disabled_is_all_true_of_candle_length() {
        let candles = make_ohlc_candles(&[(1.0, 2.0, 0.5, 1.5); 7]);
        let result = VolatilityFilter::new(false, 1, 10).evaluate(&candles);
        assert_eq!(result, vec![true; 7]);
    }

    #[test]
    fn name_and_lookback() {
        let f = VolatilityFilter::default_params();
        assert_eq!(f.name(), "volatility_filter");
        assert_eq!(f.lookback(), 9);
    }
}
