//! Structured error types for the classification engine.
//!
//! Configuration problems are raised once, when settings are built. History
//! problems are raised by the pipeline before any classification happens.
//! Series of unequal length are never an error: they are trimmed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("insufficient history: need {required} candles, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("label policy '{policy}' produced no {missing} labels: need more historical candles or change label settings")]
    IncompleteLabels {
        policy: String,
        missing: &'static str,
    },

    #[error("stale window: newest candle {newest} is older than the last stepped candle {last_stepped}")]
    StaleWindow { last_stepped: f64, newest: f64 },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl EngineError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// True for the errors a caller can fix by supplying more candles.
    pub fn is_history_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientHistory { .. } | Self::IncompleteLabels { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
