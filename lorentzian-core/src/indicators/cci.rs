//! Commodity Channel Index (CCI).
//!
//! tp = (high + low + close) / 3
//! CCI = (tp - SMA(tp)) / (0.015 * mean |tp - SMA(tp)|) over the last `period` values.
//! The first value is emitted at index 2 * (period - 1), matching the
//! classic tulip warm-up.
//! Lookback: 2 * (period - 1).
//! Edge case: zero mean deviation → 0.

const CCI_CONSTANT: f64 = 0.015;

pub fn cci_lookback(period: usize) -> usize {
    2 * period.saturating_sub(1)
}

pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let start = cci_lookback(period);
    if period == 0 || n <= start {
        return Vec::new();
    }

    let tp: Vec<f64> = (0..n).map(|i| (high[i] + low[i] + close[i]) / 3.0).collect();

    (start..n)
        .map(|i| {
            let window = &tp[i + 1 - period..=i];
            let avg = window.iter().sum::<f64>() / period as f64;
            let mean_dev = window.iter().map(|v| (v - avg).abs()).sum::<f64>() / period as f64;
            if mean_dev == 0.0 {
                0.0
            } else {
                (tp[i] - avg) / (CCI_CONSTANT * mean_dev)
            }
        })
        .collect()
}
