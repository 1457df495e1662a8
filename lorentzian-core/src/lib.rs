//! Lorentzian Core - approximate nearest-neighbor signal engine.
//!
//! This crate turns a window of OHLCV candles and one validated settings
//! object into per-candle predictions and entry/exit flags:
//! - Domain types (candles, aligned series, signal direction)
//! - Indicator primitives (EMA, SMA, RSI, ATR, CCI, RMA, ADX, scaling)
//! - Components: features, filters, kernel regression, labels, classifier
//! - Engine: the pipeline, the signal state machine, the per-context registry
//! - Settings (TOML, validated once) and deterministic fingerprints

pub mod components;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod settings;

pub use domain::{Candle, Candles, SignalDirection};
pub use engine::{
    CandleSignal, ContextKey, ContextRegistry, LatestSignal, Pipeline, PipelineOutput,
    SignalStateMachine,
};
pub use error::{EngineError, Result};
pub use settings::{LorentzianConfig, Settings};
