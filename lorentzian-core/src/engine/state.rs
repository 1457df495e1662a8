//! Per-context signal state machine.
//!
//! Turns one candle's prediction and gates into a tri-state signal and the
//! four entry/exit flags. The machine carries the previous signal and two
//! bar counters across candles; it has no terminal state.
//!
//! Only the most recent signal is kept here. The per-candle signal history of
//! a window is the `signals` array of the pipeline output.
//!
//! Timed steps remember the last candle they consumed. Stepping that candle
//! again restores the counters from before its first step, so a candle that
//! is still being built can be re-evaluated any number of times.

use serde::{Deserialize, Serialize};

use crate::domain::SignalDirection;

/// Bars after an entry at which the matching exit fires.
pub const EXIT_AFTER_BARS: usize = 4;

/// Everything the machine reads for one candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleInputs {
    pub prediction: i64,
    pub filter_all: bool,
    pub is_uptrend: bool,
    pub is_downtrend: bool,
    pub is_bullish: bool,
    pub is_bearish: bool,
}

/// Machine output for one candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandleSignal {
    pub signal: SignalDirection,
    pub start_long: bool,
    pub start_short: bool,
    pub exit_long: bool,
    pub exit_short: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Counters {
    previous_signal: SignalDirection,
    bars_since_green_entry: usize,
    bars_since_red_entry: usize,
    candles_seen: usize,
}

/// Time of the last timed step and the counters it started from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SteppedCandle {
    time: f64,
    before: Counters,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalStateMachine {
    counters: Counters,
    last_candle: Option<SteppedCandle>,
}

impl SignalStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_signal(&self) -> SignalDirection {
        self.counters.previous_signal
    }

    pub fn bars_since_green_entry(&self) -> usize {
        self.counters.bars_since_green_entry
    }

    pub fn bars_since_red_entry(&self) -> usize {
        self.counters.bars_since_red_entry
    }

    /// Candles stepped since creation or the last reset.
    pub fn candles_seen(&self) -> usize {
        self.counters.candles_seen
    }

    /// Time of the newest candle consumed by [`step_candle`](Self::step_candle).
    pub fn last_time(&self) -> Option<f64> {
        self.last_candle.map(|c| c.time)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance over the candle at `time`.
    ///
    /// Stepping the last consumed candle again recomputes it from the counters
    /// it first started from instead of counting it twice.
    pub fn step_candle(
        &mut self,
        time: f64,
        input: &CandleInputs,
        required_neighbors: f64,
    ) -> CandleSignal {
        if let Some(last) = self.last_candle.filter(|c| c.time == time) {
            self.counters = last.before;
        }
        let before = self.counters;
        let signal = self.step(input, required_neighbors);
        self.last_candle = Some(SteppedCandle { time, before });
        signal
    }

    /// Advance by one untimed candle. The last consumed time is left as is.
    pub fn step(&mut self, input: &CandleInputs, required_neighbors: f64) -> CandleSignal {
        let state = &mut self.counters;
        let prediction = input.prediction as f64;
        let signal = if prediction > required_neighbors && input.filter_all {
            SignalDirection::Long
        } else if prediction < -required_neighbors && input.filter_all {
            SignalDirection::Short
        } else {
            state.previous_signal
        };

        let is_different_signal_type = state.previous_signal != signal;
        state.previous_signal = signal;
        state.candles_seen += 1;

        let is_buy = signal == SignalDirection::Long && input.is_uptrend;
        let is_sell = signal == SignalDirection::Short && input.is_downtrend;
        let start_long = is_buy && is_different_signal_type && input.is_bullish && input.is_uptrend;
        let start_short =
            is_sell && is_different_signal_type && input.is_bearish && input.is_downtrend;

        state.bars_since_green_entry = if start_long {
            0
        } else {
            state.bars_since_green_entry + 1
        };
        state.bars_since_red_entry = if start_short {
            0
        } else {
            state.bars_since_red_entry + 1
        };

        let green = state.bars_since_green_entry;
        let red = state.bars_since_red_entry;
        let (mut exit_long, mut exit_short) = (false, false);
        if red == EXIT_AFTER_BARS {
            exit_short = true;
        } else if red < EXIT_AFTER_BARS && start_long {
            exit_short = true;
        } else if green == EXIT_AFTER_BARS {
            exit_long = true;
        } else if green < EXIT_AFTER_BARS && start_short {
            exit_long = true;
        }

        CandleSignal {
            signal,
            start_long,
            start_short,
            exit_long,
            exit_short,
        }
    }
}
