//! Candle filters - boolean gates evaluated over a whole candle window.
//!
//! Each filter produces one `bool` per candle it can evaluate (its output is
//! `lookback` shorter than the window). A disabled filter returns an all-true
//! array of the full window length so it drops out of any AND composition.

pub mod adx_filter;
pub mod ma_regime;
pub mod regime;
pub mod volatility;

use tracing::debug;

use crate::domain::{align, and_all, Candles};
use crate::settings::FilterSettings;

pub use adx_filter::AdxFilter;
pub use ma_regime::{MaTrendFilter, MovingAverage, TrendDirection};
pub use regime::{kalman_slope, normalized_slope_decline, RegimeFilter};
pub use volatility::VolatilityFilter;

/// A boolean gate over a candle window.
///
/// # Architecture invariant
/// Filters read market data only. They never see classifier or signal state.
pub trait CandleFilter: Send + Sync {
    /// Human-readable name (e.g., "volatility_filter").
    fn name(&self) -> &str;

    fn enabled(&self) -> bool;

    /// Leading candles consumed before the first output when enabled.
    fn lookback(&self) -> usize;

    /// Raw gate values, ignoring the enabled flag.
    fn compute(&self, candles: &Candles) -> Vec<bool>;

    /// Gate values honouring the enabled flag.
    fn evaluate(&self, candles: &Candles) -> Vec<bool> {
        if self.enabled() {
            self.compute(candles)
        } else {
            vec![true; candles.len()]
        }
    }
}

/// Every filter array of one window, tail-aligned, plus the composites the
/// signal state machine consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub volatility: Vec<bool>,
    pub regime: Vec<bool>,
    pub adx: Vec<bool>,
    pub ema_uptrend: Vec<bool>,
    pub ema_downtrend: Vec<bool>,
    pub sma_uptrend: Vec<bool>,
    pub sma_downtrend: Vec<bool>,
    /// volatility AND regime AND adx
    pub filter_all: Vec<bool>,
    /// ema_uptrend AND sma_uptrend
    pub is_uptrend: Vec<bool>,
    /// ema_downtrend AND sma_downtrend
    pub is_downtrend: Vec<bool>,
}

/// Instantiate the configured filters in a fixed order:
/// volatility, regime, adx, ema up, ema down, sma up, sma down.
pub fn configured_filters(settings: &FilterSettings) -> Vec<Box<dyn CandleFilter>> {
    vec![
        Box::new(VolatilityFilter::new(
            settings.use_volatility_filter,
            settings.volatility_min_length,
            settings.volatility_max_length,
        )),
        Box::new(RegimeFilter::new(
            settings.use_regime_filter,
            settings.regime_threshold,
        )),
        Box::new(AdxFilter::new(
            settings.use_adx_filter,
            settings.adx_length,
            settings.adx_threshold,
        )),
        Box::new(MaTrendFilter::new(
            settings.use_ema_filter,
            MovingAverage::Ema,
            settings.ema_period,
            TrendDirection::Up,
        )),
        Box::new(MaTrendFilter::new(
            settings.use_ema_filter,
            MovingAverage::Ema,
            settings.ema_period,
            TrendDirection::Down,
        )),
        Box::new(MaTrendFilter::new(
            settings.use_sma_filter,
            MovingAverage::Sma,
            settings.sma_period,
            TrendDirection::Up,
        )),
        Box::new(MaTrendFilter::new(
            settings.use_sma_filter,
            MovingAverage::Sma,
            settings.sma_period,
            TrendDirection::Down,
        )),
    ]
}

/// Largest warm-up among the enabled filters.
pub fn filter_lookback(settings: &FilterSettings) -> usize {
    configured_filters(settings)
        .iter()
        .filter(|f| f.enabled())
        .map(|f| f.lookback())
        .max()
        .unwrap_or(0)
}

impl Filter {
    pub fn build(settings: &FilterSettings, candles: &Candles) -> Self {
        let arrays: Vec<Vec<bool>> = configured_filters(settings)
            .iter()
            .map(|f| {
                let values = f.evaluate(candles);
                debug!(filter = f.name(), enabled = f.enabled(), len = values.len(), "filter built");
                values
            })
            .collect();
        let refs: Vec<&[bool]> = arrays.iter().map(Vec::as_slice).collect();
        let aligned = align(&refs);

        let filter_all = and_all(&[aligned[0], aligned[1], aligned[2]]);
        let is_uptrend = and_all(&[aligned[3], aligned[5]]);
        let is_downtrend = and_all(&[aligned[4], aligned[6]]);

        Self {
            volatility: aligned[0].to_vec(),
            regime: aligned[1].to_vec(),
            adx: aligned[2].to_vec(),
            ema_uptrend: aligned[3].to_vec(),
            ema_downtrend: aligned[4].to_vec(),
            sma_uptrend: aligned[5].to_vec(),
            sma_downtrend: aligned[6].to_vec(),
            filter_all,
            is_uptrend,
            is_downtrend,
        }
    }

    pub fn len(&self) -> usize {
        self.filter_all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filter_all.is_empty()
    }

    /// Keep the trailing `len` entries of every array.
    pub fn truncate_front(&mut self, len: usize) {
        for series in [
            &mut self.volatility,
            &mut self.regime,
            &mut self.adx,
            &mut self.ema_uptrend,
            &mut self.ema_downtrend,
            &mut self.sma_uptrend,
            &mut self.sma_downtrend,
            &mut self.filter_all,
            &mut self.is_uptrend,
            &mut self.is_downtrend,
        ] {
            let drop = series.len().saturating_sub(len);
            series.drain(..drop);
        }
    }
}
