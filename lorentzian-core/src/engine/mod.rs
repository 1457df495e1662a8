//! Classification engine - composes the components over a candle window and
//! owns per-context signal state.
//!
//! - `pipeline`: one settings object applied to one window
//! - `state`: the per-candle signal state machine
//! - `registry`: per-(symbol, time frame) state, rebuilt or advanced

pub mod pipeline;
pub mod registry;
pub mod state;

pub use pipeline::{LatestSignal, Pipeline, PipelineOutput};
pub use registry::{ContextKey, ContextRegistry};
pub use state::{CandleInputs, CandleSignal, SignalStateMachine, EXIT_AFTER_BARS};
