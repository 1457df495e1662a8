//! Domain types for the Lorentzian engine

pub mod candles;
pub mod series;
pub mod signal;

pub use candles::{Candle, Candles};
pub use series::{align, and_all, common_len, tail, zip_with};
pub use signal::SignalDirection;

/// Symbol type alias
pub type Symbol = String;
