//! `Candle`, the market data unit, and `Candles`, the columnar window the engine reads.

use serde::{Deserialize, Serialize};

use super::series::{common_len, tail};

/// One OHLCV candle. `time` is whatever the host uses (epoch seconds, ms, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high bounds open and close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Columnar OHLCV window for one symbol/time-frame, oldest first.
///
/// All six columns always have the same length. Columns supplied with
/// different lengths are trimmed from the front to the shortest one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candles {
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
    time: Vec<f64>,
}

impl Candles {
    pub fn new(
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
        time: Vec<f64>,
    ) -> Self {
        let len = common_len([
            open.len(),
            high.len(),
            low.len(),
            close.len(),
            volume.len(),
            time.len(),
        ]);
        let trim = |v: Vec<f64>| tail(&v, len).to_vec();
        Self {
            open: trim(open),
            high: trim(high),
            low: trim(low),
            close: trim(close),
            volume: trim(volume),
            time: trim(time),
        }
    }

    pub fn from_candles(rows: &[Candle]) -> Self {
        Self {
            open: rows.iter().map(|c| c.open).collect(),
            high: rows.iter().map(|c| c.high).collect(),
            low: rows.iter().map(|c| c.low).collect(),
            close: rows.iter().map(|c| c.close).collect(),
            volume: rows.iter().map(|c| c.volume).collect(),
            time: rows.iter().map(|c| c.time).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Typical price `(high + low + close) / 3`.
    pub fn hlc3(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| (self.high[i] + self.low[i] + self.close[i]) / 3.0)
            .collect()
    }

    /// `(open + high + low + close) / 4`.
    pub fn ohlc4(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| (self.open[i] + self.high[i] + self.low[i] + self.close[i]) / 4.0)
            .collect()
    }

    /// The trailing `len` candles.
    pub fn last(&self, len: usize) -> Self {
        Self {
            open: tail(&self.open, len).to_vec(),
            high: tail(&self.high, len).to_vec(),
            low: tail(&self.low, len).to_vec(),
            close: tail(&self.close, len).to_vec(),
            volume: tail(&self.volume, len).to_vec(),
            time: tail(&self.time, len).to_vec(),
        }
    }

    /// The leading `len` candles.
    pub fn first(&self, len: usize) -> Self {
        let len = len.min(self.len());
        Self {
            open: self.open[..len].to_vec(),
            high: self.high[..len].to_vec(),
            low: self.low[..len].to_vec(),
            close: self.close[..len].to_vec(),
            volume: self.volume[..len].to_vec(),
            time: self.time[..len].to_vec(),
        }
    }

    /// Row view of candle `i`.
    pub fn get(&self, i: usize) -> Option<Candle> {
        (i < self.len()).then(|| Candle {
            time: self.time[i],
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
            volume: self.volume[i],
        })
    }
}
