//! Indicator primitives.
//!
//! Every function here is pure and returns a series trimmed from the front:
//! no NaN warm-up padding, the output is simply `lookback` values shorter
//! than the input. Index `k` of an output belongs to input index
//! `k + lookback`, which is what tail alignment relies on.
//!
//! Single-series indicators over the close also implement the `Indicator`
//! trait so they can be named and sized generically.

pub mod adx;
pub mod atr;
pub mod cci;
pub mod ema;
pub mod rma;
pub mod rsi;
pub mod scaling;
pub mod sma;

pub use adx::{adx, adx_lookback, directional_movement_index, Adx};
pub use atr::{atr, true_range, Atr};
pub use cci::{cci, cci_lookback};
pub use ema::{ema, Ema};
pub use rma::{rma, rma_lookback};
pub use rsi::{rsi, Rsi};
pub use scaling::{normalize, rescale, rescale_series};
pub use sma::{sma, Sma};

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> crate::domain::Candles {
    use crate::domain::{Candle, Candles};
    let rows: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                time: i as f64,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    Candles::from_candles(&rows)
}

/// Create candles from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_candles(data: &[(f64, f64, f64, f64)]) -> crate::domain::Candles {
    use crate::domain::{Candle, Candles};
    let rows: Vec<Candle> = data
        .iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Candle {
            time: i as f64,
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect();
    Candles::from_candles(&rows)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
