//! RMA: Wilder's recursive moving average.
//!
//! alpha = 1/length. The seed is an SMA value, but the first
//! [`RMA_SEED_DISCARD`] SMA values are thrown away as warm-up noise, so the
//! seed is the SMA ending at input index `length - 1 + RMA_SEED_DISCARD`.
//! RMA[t] = src[t] * alpha + RMA[t-1] * (1 - alpha)
//! Lookback: length - 1 + RMA_SEED_DISCARD.

use super::sma::sma;

/// SMA values skipped before the RMA seed.
pub const RMA_SEED_DISCARD: usize = 50;

/// Number of leading input values an RMA of `length` consumes.
pub fn rma_lookback(length: usize) -> usize {
    length.saturating_sub(1) + RMA_SEED_DISCARD
}

pub fn rma(values: &[f64], length: usize) -> Vec<f64> {
    let seeds = sma(values, length);
    let Some(&seed) = seeds.get(RMA_SEED_DISCARD) else {
        return Vec::new();
    };

    let alpha = 1.0 / length as f64;
    let start = rma_lookback(length);
    let mut result = Vec::with_capacity(values.len() - start);
    let mut prev = seed;
    result.push(prev);
    for &v in &values[start + 1..] {
        prev = v * alpha + prev * (1.0 - alpha);
        result.push(prev);
    }
    result
}
