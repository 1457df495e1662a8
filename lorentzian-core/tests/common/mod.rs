//! Shared synthetic candle generators for integration tests.

#![allow(dead_code)]

use lorentzian_core::{Candle, Candles};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random walk with plausible OHLC bars.
pub fn random_walk(n: usize, seed: u64) -> Candles {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0_f64;
    let rows: Vec<Candle> = (0..n)
        .map(|i| {
            let open = price;
            price = (price + rng.gen_range(-2.0..2.0)).max(10.0);
            let close = price;
            let high = open.max(close) + rng.gen_range(0.05..1.5);
            let low = open.min(close) - rng.gen_range(0.05..1.5);
            Candle {
                time: i as f64 * 60.0,
                open,
                high,
                low,
                close,
                volume: rng.gen_range(100.0..10_000.0),
            }
        })
        .collect();
    Candles::from_candles(&rows)
}

/// Smooth oscillating market: deterministic, with both up and down legs.
pub fn oscillating(n: usize) -> Candles {
    let rows: Vec<Candle> = (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + (t * 0.13).sin() * 8.0 + (t * 0.031).sin() * 5.0;
            let open = close - (t * 0.4).cos() * 0.5;
            Candle {
                time: t * 60.0,
                open,
                high: open.max(close) + 0.75,
                low: open.min(close) - 0.75,
                close,
                volume: 1_000.0,
            }
        })
        .collect();
    Candles::from_candles(&rows)
}
