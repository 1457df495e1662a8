//! Per-(symbol, time frame) ownership of signal state.
//!
//! The registry holds one validated settings object and one state machine per
//! context. Contexts never share mutable state, so independent contexts can
//! be rebuilt in parallel. All mutation goes through `&mut self`.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{Candles, Symbol};
use crate::error::Result;
use crate::settings::Settings;

use super::pipeline::{LatestSignal, Pipeline, PipelineOutput};
use super::state::SignalStateMachine;

/// Identifies one independent signal context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextKey {
    pub symbol: Symbol,
    pub time_frame: String,
}

impl ContextKey {
    pub fn new(symbol: impl Into<Symbol>, time_frame: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            time_frame: time_frame.into(),
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.time_frame)
    }
}

#[derive(Debug, Clone)]
pub struct ContextRegistry {
    pipeline: Pipeline,
    contexts: BTreeMap<ContextKey, SignalStateMachine>,
}

impl ContextRegistry {
    pub fn new(settings: Settings) -> Self {
        Self {
            pipeline: Pipeline::new(settings),
            contexts: BTreeMap::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.pipeline.settings()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn contains(&self, key: &ContextKey) -> bool {
        self.contexts.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ContextKey> {
        self.contexts.keys()
    }

    /// Stored machine of a context.
    pub fn state(&self, key: &ContextKey) -> Option<&SignalStateMachine> {
        self.contexts.get(key)
    }

    /// Full recompute with fresh counters. A failed rebuild leaves no state.
    pub fn rebuild(&mut self, key: &ContextKey, candles: &Candles) -> Result<PipelineOutput> {
        let mut machine = SignalStateMachine::new();
        match self.pipeline.run_with(candles, &mut machine) {
            Ok(output) => {
                debug!(context = %key, aligned = output.len(), "context rebuilt");
                self.contexts.insert(key.clone(), machine);
                Ok(output)
            }
            Err(e) => {
                self.contexts.remove(key);
                Err(e)
            }
        }
    }

    /// Step a context over every candle of `candles` newer than its last one.
    ///
    /// Advancing again over the same newest candle re-evaluates it without
    /// counting it twice. A context without history is rebuilt over the whole
    /// window first, and only its last candle is returned.
    pub fn advance(&mut self, key: &ContextKey, candles: &Candles) -> Result<Vec<LatestSignal>> {
        if let Some(machine) = self
            .contexts
            .get_mut(key)
            .filter(|m| m.last_time().is_some())
        {
            return self.pipeline.advance(candles, machine);
        }

        let output = self.rebuild(key, candles)?;
        let k = output.len() - 1;
        Ok(vec![LatestSignal {
            time: output.time[k],
            prediction: output.predictions[k],
            signal: output.last_signal().unwrap_or_default(),
        }])
    }

    /// Replace the settings. Every context loses its state.
    pub fn reconfigure(&mut self, settings: Settings) {
        info!(
            from = %self.pipeline.settings().fingerprint(),
            to = %settings.fingerprint(),
            dropped = self.contexts.len(),
            "registry reconfigured"
        );
        self.pipeline = Pipeline::new(settings);
        self.contexts.clear();
    }

    /// Forget a context. Returns whether it existed.
    pub fn remove(&mut self, key: &ContextKey) -> bool {
        self.contexts.remove(key).is_some()
    }

    /// Rebuild many contexts in parallel. Results come back in input order.
    pub fn rebuild_all(
        &mut self,
        inputs: &[(ContextKey, Candles)],
    ) -> Vec<(ContextKey, Result<PipelineOutput>)> {
        let pipeline = &self.pipeline;
        let results: Vec<_> = inputs
            .par_iter()
            .map(|(key, candles)| {
                let mut machine = SignalStateMachine::new();
                let output = pipeline.run_with(candles, &mut machine);
                (key.clone(), machine, output)
            })
            .collect();

        results
            .into_iter()
            .map(|(key, machine, output)| {
                match &output {
                    Ok(_) => {
                        self.contexts.insert(key.clone(), machine);
                    }
                    Err(e) => {
                        warn!(context = %key, error = %e, "context rebuild failed");
                        self.contexts.remove(&key);
                    }
                }
                (key, output)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use crate::error::EngineError;
    use crate::settings::{FilterSettings, LorentzianConfig};

    fn settings(neighbors: usize) -> Settings {
        let config = LorentzianConfig {
            filters: FilterSettings::disabled(),
            general: crate::settings::GeneralConfig {
                neighbors_count: neighbors,
                max_bars_back: 200,
                ..Default::default()
            },
            ..LorentzianConfig::default()
        };
        Settings::from_config(&config).unwrap()
    }

    fn candles(n: usize, phase: f64) -> Candles {
        let rows: Vec<Candle> = (0..n)
            .map(|i| {
                let t = i as f64;
                let close = 50.0 + ((t + phase) * 0.17).sin() * 3.0 + (t * 0.05).cos();
                Candle {
                    time: t,
                    open: close - 0.2,
                    high: close + 0.6,
                    low: close - 0.7,
                    close,
                    volume: 10.0,
                }
            })
            .collect();
        Candles::from_candles(&rows)
    }

    #[test]
    fn rebuild_stores_state() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("BTCUSDT", "1h");
        let out = registry.rebuild(&key, &candles(250, 0.0)).unwrap();
        let state = registry.state(&key).unwrap();
        assert_eq!(state.candles_seen(), out.len());
        assert_eq!(state.previous_signal(), out.signals[out.len() - 1]);
    }

    #[test]
    fn rebuild_twice_is_identical() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("ETHUSDT", "15m");
        let window = candles(250, 1.0);
        let a = registry.rebuild(&key, &window).unwrap();
        let first_state = registry.state(&key).cloned();
        let b = registry.rebuild(&key, &window).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(first_state.as_ref(), registry.state(&key));
    }

    #[test]
    fn advance_without_history_rebuilds() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("SOLUSDT", "4h");
        let window = candles(250, 2.0);
        let latest = registry.advance(&key, &window).unwrap();
        let full = registry.pipeline().run(&window).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].time, 249.0);
        assert_eq!(Some(latest[0].prediction), full.last_prediction());
        assert_eq!(Some(latest[0].signal), full.last_signal());
    }

    #[test]
    fn advance_steps_the_next_candle_once() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("BTCUSDT", "1h");
        let window = candles(260, 0.5);
        registry.rebuild(&key, &window.first(259)).unwrap();
        let before = registry.state(&key).unwrap().candles_seen();
        let latest = registry.advance(&key, &window).unwrap();
        assert_eq!(latest.last().map(|s| s.time), Some(259.0));
        assert_eq!(registry.state(&key).unwrap().candles_seen(), before + 1);
    }

    #[test]
    fn repeated_advance_leaves_state_alone() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("ETHUSDT", "1h");
        let window = candles(260, 1.5);
        registry.rebuild(&key, &window).unwrap();
        let settled = registry.state(&key).cloned();

        let first = registry.advance(&key, &window).unwrap();
        let second = registry.advance(&key, &window).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.state(&key).cloned(), settled);
    }

    #[test]
    fn advance_catches_up_over_a_gap() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("XRPUSDT", "5m");
        let window = candles(262, 0.25);
        registry.rebuild(&key, &window.first(260)).unwrap();
        let before = registry.state(&key).unwrap().clone();

        let stepped = registry.advance(&key, &window).unwrap();
        let times: Vec<f64> = stepped.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![259.0, 260.0, 261.0]);

        let after = registry.state(&key).unwrap();
        assert_eq!(after.candles_seen(), before.candles_seen() + 2);
        assert_eq!(after.last_time(), Some(261.0));
        assert_eq!(after.previous_signal(), stepped[2].signal.signal);
    }

    #[test]
    fn stale_advance_keeps_the_context() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("ADAUSDT", "1h");
        let window = candles(260, 0.0);
        registry.rebuild(&key, &window).unwrap();
        let err = registry.advance(&key, &window.first(240)).unwrap_err();
        assert!(matches!(err, EngineError::StaleWindow { .. }));
        assert_eq!(registry.state(&key).and_then(|m| m.last_time()), Some(259.0));
    }

    #[test]
    fn reconfigure_drops_every_context() {
        let mut registry = ContextRegistry::new(settings(8));
        registry.rebuild(&ContextKey::new("A", "1h"), &candles(250, 0.0)).unwrap();
        registry.rebuild(&ContextKey::new("B", "1h"), &candles(250, 3.0)).unwrap();
        assert_eq!(registry.len(), 2);

        registry.reconfigure(settings(5));
        assert!(registry.is_empty());
        assert_eq!(registry.settings().classification().neighbors_count, 5);
    }

    #[test]
    fn remove_reports_presence() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("A", "1d");
        registry.rebuild(&key, &candles(250, 0.0)).unwrap();
        assert!(registry.remove(&key));
        assert!(!registry.remove(&key));
    }

    #[test]
    fn failed_rebuild_leaves_no_state() {
        let mut registry = ContextRegistry::new(settings(8));
        let key = ContextKey::new("A", "1m");
        registry.rebuild(&key, &candles(250, 0.0)).unwrap();
        let err = registry.rebuild(&key, &candles(10, 0.0)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientHistory { .. }));
        assert!(!registry.contains(&key));
    }

    #[test]
    fn rebuild_all_matches_sequential_rebuilds() {
        let inputs: Vec<(ContextKey, Candles)> = (0..6)
            .map(|i| (ContextKey::new(format!("S{i}"), "1h"), candles(240, i as f64)))
            .collect();

        let mut parallel = ContextRegistry::new(settings(8));
        let results = parallel.rebuild_all(&inputs);

        let mut sequential = ContextRegistry::new(settings(8));
        for ((key, window), (result_key, result)) in inputs.iter().zip(&results) {
            assert_eq!(key, result_key);
            let expected = sequential.rebuild(key, window).unwrap();
            assert_eq!(result.as_ref().unwrap().digest(), expected.digest());
            assert_eq!(parallel.state(key), sequential.state(key));
        }
        assert_eq!(parallel.len(), 6);
    }

    #[test]
    fn context_key_display() {
        assert_eq!(ContextKey::new("BTCUSDT", "1h").to_string(), "BTCUSDT@1h");
    }
}
