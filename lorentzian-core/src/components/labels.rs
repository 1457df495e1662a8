//! Training labels - the historical ground truth the classifier votes with.
//!
//! Labels look into the future of each candle, so they exist only for
//! history: the last candles of a window, which lack enough future bars,
//! are labelled neutral. The output always has the candle window's length.

use tracing::debug;

use crate::domain::{Candles, SignalDirection};
use crate::error::{EngineError, Result};
use crate::settings::LabelPolicy;

/// Label every candle of the window with the configured policy.
pub fn generate_labels(policy: &LabelPolicy, candles: &Candles) -> Vec<SignalDirection> {
    let labels = match *policy {
        LabelPolicy::WinningTrade {
            win_percent,
            loss_percent,
        } => winning_trade(candles, win_percent, loss_percent),
        LabelPolicy::InProfitAfterBars { bars } => {
            in_profit_after(candles.close(), candles.high(), candles.low(), bars)
        }
        LabelPolicy::InProfitAfterBarsCloses { bars } => {
            let close = candles.close();
            in_profit_after(close, close, close, bars)
        }
    };
    debug!(policy = policy.name(), len = labels.len(), "labels generated");
    labels
}

/// Short when the future `high` is below today's close, long when the future
/// `low` is above it.
fn in_profit_after(close: &[f64], high: &[f64], low: &[f64], bars: usize) -> Vec<SignalDirection> {
    let n = close.len();
    (0..n)
        .map(|i| {
            let Some(j) = i.checked_add(bars).filter(|&j| j < n) else {
                return SignalDirection::Neutral;
            };
            if high[j] < close[i] {
                SignalDirection::Short
            } else if low[j] > close[i] {
                SignalDirection::Long
            } else {
                SignalDirection::Neutral
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trade {
    Open,
    Won,
    Lost,
}

/// Walk forward from each close until the long or the short trade settles.
fn winning_trade(candles: &Candles, win_percent: f64, loss_percent: f64) -> Vec<SignalDirection> {
    let (high, low, close) = (candles.high(), candles.low(), candles.close());
    let win = win_percent / 100.0;
    let loss = loss_percent / 100.0;

    (0..close.len())
        .map(|i| {
            let entry = close[i];
            let (long_target, long_stop) = (entry * (1.0 + win), entry * (1.0 - loss));
            let (short_target, short_stop) = (entry * (1.0 - win), entry * (1.0 + loss));
            let mut long = Trade::Open;
            let mut short = Trade::Open;

            for j in i + 1..close.len() {
                if long == Trade::Open {
                    if low[j] <= long_stop {
                        long = Trade::Lost;
                    } else if high[j] >= long_target {
                        long = Trade::Won;
                    }
                }
                if short == Trade::Open {
                    if high[j] >= short_stop {
                        short = Trade::Lost;
                    } else if low[j] <= short_target {
                        short = Trade::Won;
                    }
                }
                match (long, short) {
                    (Trade::Won, Trade::Won) => return SignalDirection::Neutral,
                    (Trade::Won, _) => return SignalDirection::Long,
                    (_, Trade::Won) => return SignalDirection::Short,
                    (Trade::Lost, Trade::Lost) => return SignalDirection::Neutral,
                    _ => {}
                }
            }
            SignalDirection::Neutral
        })
        .collect()
}

/// Fail when the labels cannot teach both directions.
pub fn check_completeness(policy: &LabelPolicy, labels: &[SignalDirection]) -> Result<()> {
    let missing = if !labels.iter().any(|l| l.is_long()) {
        Some("long")
    } else if !labels.iter().any(|l| l.is_short()) {
        Some("short")
    } else {
        None
    };
    match missing {
        Some(missing) => Err(EngineError::IncompleteLabels {
            policy: policy.name().to_string(),
            missing,
        }),
        None => Ok(()),
    }
}
