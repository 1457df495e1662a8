//! Moving-average trend filters.
//!
//! Uptrend passes where `close > MA(close, period)`, downtrend where
//! `close < MA(close, period)`. The MA is either an EMA (lookback 0) or
//! an SMA (lookback period - 1).

use crate::domain::{zip_with, Candles};
use crate::indicators::{ema, sma};

use super::CandleFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovingAverage {
    Ema,
    Sma,
}

/// Which side of the moving average the close must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct MaTrendFilter {
    pub enabled: bool,
    pub average: MovingAverage,
    pub period: usize,
    pub direction: TrendDirection,
    name: String,
}

impl MaTrendFilter {
    pub fn new(
        enabled: bool,
        average: MovingAverage,
        period: usize,
        direction: TrendDirection,
    ) -> Self {
        assert!(period >= 1, "period must be >= 1");
        let ma = match average {
            MovingAverage::Ema => "ema",
            MovingAverage::Sma => "sma",
        };
        let dir = match direction {
            TrendDirection::Up => "uptrend",
            TrendDirection::Down => "downtrend",
        };
        Self {
            enabled,
            average,
            period,
            direction,
            name: format!("{ma}_{dir}_{period}"),
        }
    }
}

impl CandleFilter for MaTrendFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn lookback(&self) -> usize {
        match self.average {
            MovingAverage::Ema => 0,
            MovingAverage::Sma => self.period - 1,
        }
    }

    fn compute(&self, candles: &Candles) -> Vec<bool> {
        let close = candles.close();
        let ma = match self.average {
            MovingAverage::Ema => ema(close, self.period),
            MovingAverage::Sma => sma(close, self.period),
        };
        match self.direction {
            TrendDirection::Up => zip_with(close, &ma, |c, m| c > m),
            TrendDirection::Down => zip_with(close, &ma, |c, m| c < m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn sma_uptrend_on_rising_closes() {
        let candles = make_candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let up = MaTrendFilter::new(true, MovingAverage::Sma, 3, TrendDirection::Up);
        let down = MaTrendFilter::new(true, MovingAverage::Sma, 3, TrendDirection::Down);
        assert_eq!(up.evaluate(&candles), vec![true, true, true]);
        assert_eq!(down.evaluate(&candles), vec![false, false, false]);
    }

    #[test]
    fn ema_keeps_full_length() {
        let candles = make_candles(&[5.0, 4.0, 3.0, 4.0]);
        let down = MaTrendFilter::new(true, MovingAverage::Ema, 2, TrendDirection::Down);
        let result = down.evaluate(&candles);
        // EMA[0] == close[0], so the first candle is neither up nor down.
        assert_eq!(result.len(), 4);
        assert_eq!(result[..3], [false, true, true]);
    }

    #[test]
    fn disabled_is_all_true() {
        let candles = make_candles(&[3.0, 2.0, 1.0]);
        let f = MaTrendFilter::new(false, MovingAverage::Sma, 200, TrendDirection::Up);
        assert_eq!(f.evaluate(&candles), vec![true; 3]);
    }

    #[test]
    fn names_encode_average_and_direction() {
        let f = MaTrendFilter::new(true, MovingAverage::Ema, 200, TrendDirection::Down);
        assert_eq!(f.name(), "ema_downtrend_200");
    }
}
