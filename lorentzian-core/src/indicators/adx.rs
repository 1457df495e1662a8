//! ADX (Average Directional Index).
//!
//! Steps:
//! 1. For index > 0 compute TR, +DM and -DM from consecutive candles
//! 2. Wilder running sums: s[t] = s[t-1] - s[t-1]/length + raw[t], seeded at 0
//! 3. +DI = 100 * s(+DM) / s(TR), -DI = 100 * s(-DM) / s(TR)
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI), only for index > 3
//! 5. ADX = RMA(DX, length)
//!
//! The first four candles never produce a DX value.
//! Lookback: 4 + RMA lookback.

use crate::components::indicator::Indicator;
use crate::domain::Candles;

use super::rma::{rma, rma_lookback};

/// Candles skipped before the first DX value.
pub const DX_WARMUP: usize = 4;

#[derive(Debug, Clone)]
pub struct Adx {
    length: usize,
    name: String,
}

impl Adx {
    pub fn new(length: usize) -> Self {
        assert!(length >= 1, "ADX length must be >= 1");
        Self {
            length,
            name: format!("adx_{length}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        adx_lookback(self.length)
    }

    fn compute(&self, candles: &Candles) -> Vec<f64> {
        adx(candles.high(), candles.low(), candles.close(), self.length)
    }
}

pub fn adx_lookback(length: usize) -> usize {
    DX_WARMUP + rma_lookback(length)
}

/// DX series; element k belongs to candle `k + DX_WARMUP`.
pub fn directional_movement_index(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    if length == 0 || n <= DX_WARMUP {
        return Vec::new();
    }

    let len = length as f64;
    let mut smoothed_tr = 0.0;
    let mut smoothed_plus_dm = 0.0;
    let mut smoothed_minus_dm = 0.0;
    let mut dx = Vec::with_capacity(n - DX_WARMUP);

    for i in 1..n {
        let tr = (high[i] - low[i])
            .max((high[i] - close[i - 1]).abs())
            .max((low[i] - close[i - 1]).abs());
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];
        let plus_dm = if up_move > down_move { up_move.max(0.0) } else { 0.0 };
        let minus_dm = if down_move > up_move { down_move.max(0.0) } else { 0.0 };

        smoothed_tr = smoothed_tr - smoothed_tr / len + tr;
        smoothed_plus_dm = smoothed_plus_dm - smoothed_plus_dm / len + plus_dm;
        smoothed_minus_dm = smoothed_minus_dm - smoothed_minus_dm / len + minus_dm;

        if i < DX_WARMUP {
            continue;
        }

        let (plus_di, minus_di) = if smoothed_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * smoothed_plus_dm / smoothed_tr,
                100.0 * smoothed_minus_dm / smoothed_tr,
            )
        };
        let di_sum = plus_di + minus_di;
        dx.push(if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        });
    }

    dx
}

pub fn adx(high: &[f64], low: &[f64], close: &[f64], length: usize) -> Vec<f64> {
    rma(&directional_movement_index(high, low, close, length), length)
}
