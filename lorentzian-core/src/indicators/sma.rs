//! Simple Moving Average (SMA).
//!
//! Rolling mean over a window of `period` values.
//! Output index k covers input values k..k+period, so the output is
//! `period - 1` shorter than the input.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Candles;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &Candles) -> Vec<f64> {
        sma(candles.close(), self.period)
    }
}

/// SMA of an arbitrary series.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    if period == 0 || n < period {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(n - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    result.push(sum / period as f64);

    // Roll the window forward
    for i in period..n {
        sum = sum - values[i - period] + values[i];
        result.push(sum / period as f64);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn sma_3_known_values() {
        let candles = make_candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = Sma::new(3).compute(&candles);
        assert_eq!(result.len(), 3);
        assert_approx(result[0], 2.0, DEFAULT_EPSILON);
        assert_approx(result[1], 3.0, DEFAULT_EPSILON);
        assert_approx(result[2], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_too_few_values() {
        assert!(sma(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn sma_period_equals_len() {
        let result = sma(&[2.0, 4.0, 6.0], 3);
        assert_eq!(result, vec![4.0]);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(1).lookback(), 0);
    }
}
