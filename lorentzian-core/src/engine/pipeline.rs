//! One settings object applied to one candle window.
//!
//! Stages, in order:
//! 1. Features, labels, filters and kernel, each over the full window
//! 2. Tail alignment of all of them to the shortest length, capped at
//!    `max_bars_back`
//! 3. Label completeness check
//! 4. Nearest-neighbor prediction per aligned candle
//! 5. Signal state machine over the aligned candles
//!
//! Index `k` of every output array refers to candle `len - aligned + k` of the
//! input window.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::components::{
    build_features, check_completeness, classify_all, classify_range, feature_lookback,
    filter_lookback, generate_labels, kernel_lookback, FeatureArrays, Filter, KernelSignals,
};
use crate::domain::{tail, Candles, SignalDirection};
use crate::error::{EngineError, Result};
use crate::fingerprint::{DigestBuilder, OutputDigest};
use crate::settings::Settings;

use super::state::{CandleInputs, CandleSignal, SignalStateMachine};

/// Every series the state machine needs, tail-aligned to one length.
struct Stages {
    time: Vec<f64>,
    features: FeatureArrays,
    labels: Vec<SignalDirection>,
    filter: Filter,
    kernel: KernelSignals,
}

impl Stages {
    fn len(&self) -> usize {
        self.filter.len()
    }

    fn inputs(&self, k: usize, prediction: i64) -> CandleInputs {
        CandleInputs {
            prediction,
            filter_all: self.filter.filter_all[k],
            is_uptrend: self.filter.is_uptrend[k],
            is_downtrend: self.filter.is_downtrend[k],
            is_bullish: self.kernel.is_bullish[k],
            is_bearish: self.kernel.is_bearish[k],
        }
    }
}

/// Full-window result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub time: Vec<f64>,
    pub predictions: Vec<i64>,
    pub signals: Vec<SignalDirection>,
    pub start_long: Vec<bool>,
    pub start_short: Vec<bool>,
    pub exit_long: Vec<bool>,
    pub exit_short: Vec<bool>,
    pub kernel_rational_quadratic: Vec<f64>,
    pub kernel_gaussian: Vec<f64>,
    pub filter_all: Vec<bool>,
}

impl PipelineOutput {
    fn with_capacity(len: usize) -> Self {
        Self {
            time: Vec::with_capacity(len),
            predictions: Vec::with_capacity(len),
            signals: Vec::with_capacity(len),
            start_long: Vec::with_capacity(len),
            start_short: Vec::with_capacity(len),
            exit_long: Vec::with_capacity(len),
            exit_short: Vec::with_capacity(len),
            kernel_rational_quadratic: Vec::new(),
            kernel_gaussian: Vec::new(),
            filter_all: Vec::new(),
        }
    }

    fn push(&mut self, time: f64, prediction: i64, signal: CandleSignal) {
        self.time.push(time);
        self.predictions.push(prediction);
        self.signals.push(signal.signal);
        self.start_long.push(signal.start_long);
        self.start_short.push(signal.start_short);
        self.exit_long.push(signal.exit_long);
        self.exit_short.push(signal.exit_short);
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn last_prediction(&self) -> Option<i64> {
        self.predictions.last().copied()
    }

    /// Signal and flags of the most recent candle.
    pub fn last_signal(&self) -> Option<CandleSignal> {
        let i = self.len().checked_sub(1)?;
        Some(CandleSignal {
            signal: self.signals[i],
            start_long: self.start_long[i],
            start_short: self.start_short[i],
            exit_long: self.exit_long[i],
            exit_short: self.exit_short[i],
        })
    }

    /// Deterministic hash of every output array.
    pub fn digest(&self) -> OutputDigest {
        let signals: Vec<i64> = self.signals.iter().map(|s| s.value()).collect();
        DigestBuilder::new()
            .floats(&self.time)
            .ints(&self.predictions)
            .ints(&signals)
            .bools(&self.start_long)
            .bools(&self.start_short)
            .bools(&self.exit_long)
            .bools(&self.exit_short)
            .floats(&self.kernel_rational_quadratic)
            .floats(&self.kernel_gaussian)
            .bools(&self.filter_all)
            .finish()
    }
}

/// Result of stepping a machine over one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestSignal {
    pub time: f64,
    pub prediction: i64,
    #[serde(flatten)]
    pub signal: CandleSignal,
}

/// Runs the full classification chain under one validated settings object.
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Largest warm-up of any configured component.
    pub fn warmup(&self) -> usize {
        let features = self
            .settings
            .features()
            .iter()
            .map(feature_lookback)
            .max()
            .unwrap_or(0);
        features
            .max(filter_lookback(self.settings.filters()))
            .max(kernel_lookback(self.settings.kernel()))
    }

    /// Fewest candles a window must hold: `max_bars_back`, or one more than
    /// the warm-up when that is larger.
    pub fn min_candles(&self) -> usize {
        (self.warmup() + 1).max(self.settings.classification().max_bars_back)
    }

    fn stages(&self, candles: &Candles) -> Result<Stages> {
        let required = self.min_candles();
        let max_bars_back = self.settings.classification().max_bars_back;
        if candles.len() < required {
            return Err(EngineError::InsufficientHistory {
                required,
                available: candles.len(),
            });
        }

        let mut features = build_features(self.settings.features(), candles);
        let labels = generate_labels(self.settings.labels(), candles);
        let mut filter = Filter::build(self.settings.filters(), candles);
        let mut kernel = KernelSignals::build(self.settings.kernel(), candles);

        let len = features
            .len()
            .min(filter.len())
            .min(kernel.len())
            .min(max_bars_back);
        debug!(
            candles = candles.len(),
            features = features.len(),
            filter = filter.len(),
            kernel = kernel.len(),
            max_bars_back,
            aligned = len,
            "pipeline stages built"
        );
        if len == 0 {
            return Err(EngineError::InsufficientHistory {
                required,
                available: candles.len(),
            });
        }

        features.truncate_front(len);
        filter.truncate_front(len);
        kernel.truncate_front(len);
        let labels = tail(&labels, len).to_vec();
        check_completeness(self.settings.labels(), &labels)?;

        Ok(Stages {
            time: tail(candles.time(), len).to_vec(),
            features,
            labels,
            filter,
            kernel,
        })
    }

    /// Classify the whole window with a fresh state machine.
    pub fn run(&self, candles: &Candles) -> Result<PipelineOutput> {
        let mut machine = SignalStateMachine::new();
        self.run_with(candles, &mut machine)
    }

    /// Classify the whole window, stepping `machine` over every aligned candle.
    pub fn run_with(
        &self,
        candles: &Candles,
        machine: &mut SignalStateMachine,
    ) -> Result<PipelineOutput> {
        let stages = self.stages(candles)?;
        let classification = self.settings.classification();
        let predictions = classify_all(classification, &stages.features, &stages.labels);

        let mut output = PipelineOutput::with_capacity(stages.len());
        for (k, &prediction) in predictions.iter().enumerate() {
            let signal = machine.step_candle(
                stages.time[k],
                &stages.inputs(k, prediction),
                classification.required_neighbors,
            );
            output.push(stages.time[k], prediction, signal);
        }
        output.kernel_rational_quadratic = stages.kernel.rational_quadratic;
        output.kernel_gaussian = stages.kernel.gaussian;
        output.filter_all = stages.filter.filter_all;

        info!(
            candles = candles.len(),
            aligned = output.len(),
            last_prediction = output.last_prediction(),
            fingerprint = %self.settings.fingerprint(),
            "pipeline run complete"
        );
        Ok(output)
    }

    /// Step `machine` over every aligned candle it has not consumed yet.
    ///
    /// The last consumed candle is stepped again from its earlier counters, so
    /// advancing twice over the same window leaves the machine unchanged. A
    /// machine whose last candle precedes the whole window starts over. The
    /// stepped candles come back oldest first.
    pub fn advance(
        &self,
        candles: &Candles,
        machine: &mut SignalStateMachine,
    ) -> Result<Vec<LatestSignal>> {
        let stages = self.stages(candles)?;
        let len = stages.len();
        let (first, newest) = (stages.time[0], stages.time[len - 1]);
        let start = match machine.last_time() {
            Some(last) if newest < last => {
                return Err(EngineError::StaleWindow {
                    last_stepped: last,
                    newest,
                })
            }
            Some(last) if first <= last => stages.time.partition_point(|&t| t < last),
            Some(last) => {
                warn!(
                    last_stepped = last,
                    first,
                    "window skips past the machine, starting over"
                );
                machine.reset();
                0
            }
            None => 0,
        };

        let classification = self.settings.classification();
        let predictions =
            classify_range(classification, &stages.features, &stages.labels, start..len);
        let stepped: Vec<LatestSignal> = (start..len)
            .zip(predictions)
            .map(|(k, prediction)| {
                let time = stages.time[k];
                let signal = machine.step_candle(
                    time,
                    &stages.inputs(k, prediction),
                    classification.required_neighbors,
                );
                LatestSignal {
                    time,
                    prediction,
                    signal,
                }
            })
            .collect();
        debug!(stepped = stepped.len(), newest, "machine advanced");
        Ok(stepped)
    }
}
