//! Regime filter - separates trending from ranging markets.
//!
//! A Kalman-like adaptive smoother runs over ohlc4:
//!   v1[t]    = 0.2 * (src[t] - src[t-1]) + 0.8 * v1[t-1]
//!   v2[t]    = 0.1 * (high[t] - low[t]) + 0.8 * v2[t-1]
//!   omega    = |v1 / v2|
//!   alpha    = (-omega^2 + sqrt(omega^4 + 16 * omega^2)) / 8
//!   klmf[t]  = alpha * src[t] + (1 - alpha) * klmf[t-1]
//!   slope[t] = |klmf[t] - klmf[t-1]|
//! The filter passes where the normalized slope decline
//! `(slope - EMA(slope, 200)) / EMA(slope, 200)` is at or above the threshold.
//! Lookback: 1.

use crate::domain::Candles;
use crate::indicators::ema;

use super::CandleFilter;

const SLOPE_EMA_PERIOD: usize = 200;

#[derive(Debug, Clone)]
pub struct RegimeFilter {
    pub enabled: bool,
    pub threshold: f64,
}

impl RegimeFilter {
    pub fn new(enabled: bool, threshold: f64) -> Self {
        Self { enabled, threshold }
    }

    pub fn default_params() -> Self {
        Self::new(true, -0.1)
    }
}

/// Absolute slope of the adaptive smoother; element k belongs to candle k + 1.
pub fn kalman_slope(src: &[f64], high: &[f64], low: &[f64]) -> Vec<f64> {
    let n = src.len().min(high.len()).min(low.len());
    if n < 2 {
        return Vec::new();
    }

    let mut value1 = 0.0;
    let mut value2 = 0.0;
    let mut klmf = src[0];
    let mut slope = Vec::with_capacity(n - 1);

    for i in 1..n {
        value1 = 0.2 * (src[i] - src[i - 1]) + 0.8 * value1;
        value2 = 0.1 * (high[i] - low[i]) + 0.8 * value2;
        let omega = if value2 == 0.0 {
            0.0
        } else {
            (value1 / value2).abs()
        };
        let omega_sq = omega * omega;
        let alpha = (-omega_sq + (omega_sq * omega_sq + 16.0 * omega_sq).sqrt()) / 8.0;
        let next = alpha * src[i] + (1.0 - alpha) * klmf;
        slope.push((next - klmf).abs());
        klmf = next;
    }

    slope
}

/// `(slope - EMA(slope)) / EMA(slope)`; a zero average yields 0.
pub fn normalized_slope_decline(slope: &[f64]) -> Vec<f64> {
    let avg = ema(slope, SLOPE_EMA_PERIOD);
    slope
        .iter()
        .zip(&avg)
        .map(|(&s, &a)| if a == 0.0 { 0.0 } else { (s - a) / a })
        .collect()
}

impl CandleFilter for RegimeFilter {
    fn name(&self) -> &str {
        "regime_filter"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, candles: &Candles) -> Vec<bool> {
        let slope = kalman_slope(&candles.ohlc4(), candles.high(), candles.low());
        normalized_slope_decline(&slope)
            .into_iter()
            .map(|nsd| nsd >= self.threshold)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn first_slope_step_by_hand() {
        // src 10 -> 12, range 2 on the second candle
        // v1 = 0.2 * 2 = 0.4, v2 = 0.1 * 2 = 0.2, omega = 2
        // alpha = (-4 + sqrt(16 + 64)) / 8 = (-4 + 8.944...) / 8
        // slope = alpha * (12 - 10)
        let slope = kalman_slope(&[10.0, 12.0], &[11.0, 13.0], &[9.0, 11.0]);
        let alpha = (-4.0 + 80.0_f64.sqrt()) / 8.0;
        assert_eq!(slope.len(), 1);
        assert_approx(slope[0], alpha * 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn smoother_never_overshoots_the_source() {
        for range in [0.5, 2.0, 8.0, 40.0] {
            let slope = kalman_slope(&[0.0, 10.0], &[0.0, 10.0 + range], &[0.0, 10.0]);
            assert!(slope[0] > 0.0 && slope[0] <= 10.0, "range {range}: {}", slope[0]);
        }
    }

    #[test]
    fn output_is_one_shorter_than_input() {
        let candles = make_candles(&(0..50).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let result = RegimeFilter::default_params().evaluate(&candles);
        assert_eq!(result.len(), 49);
    }

    #[test]
    fn disabled_is_all_true_of_input_length() {
        let candles = make_candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = RegimeFilter::new(false, 0.0).evaluate(&candles);
        assert_eq!(result, vec![true; 5]);
    }

    #[test]
    fn flat_market_passes_non_positive_threshold() {
        let candles = make_candles(&[100.0; 30]);
        let result = RegimeFilter::new(true, 0.0).evaluate(&candles);
        assert!(result.iter().all(|&p| p));
    }
}
