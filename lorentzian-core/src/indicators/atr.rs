//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), TR[0] = high-low.
//! ATR seed: mean of the first `period` true ranges, then Wilder smoothing
//! (alpha = 1/period).
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Candles;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &Candles) -> Vec<f64> {
        atr(candles.high(), candles.low(), candles.close(), self.period)
    }
}

/// True range per candle. The first candle has no previous close, so its
/// range is just `high - low`.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    (0..n)
        .map(|i| {
            let (h, l) = (high[i], low[i]);
            if i == 0 {
                h - l
            } else {
                let pc = close[i - 1];
                (h - l).max((h - pc).abs()).max((l - pc).abs())
            }
        })
        .collect()
}

/// ATR over high/low/close slices of equal length.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tr = true_range(high, low, close);
    let n = tr.len();
    if period == 0 || n < period {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(n - period + 1);
    let mut prev = tr[..period].iter().sum::<f64>() / period as f64;
    result.push(prev);

    let len = period as f64;
    for &v in &tr[period..] {
        prev = (prev * (len - 1.0) + v) / len;
        result.push(prev);
    }
    result
}
