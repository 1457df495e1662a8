//! Serializable configuration and its validated, immutable counterpart.
//!
//! `LorentzianConfig` is what a host deserializes (TOML or JSON). It is
//! turned into `Settings` exactly once by `Settings::from_config`, which
//! performs every configuration check. Nothing downstream re-validates or
//! mutates settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, Result};
use crate::fingerprint::SettingsFingerprint;

/// Minimum and maximum number of configured features.
pub const MIN_FEATURES: usize = 2;
pub const MAX_FEATURES: usize = 5;

// ─── Features ────────────────────────────────────────────────────────

/// Indicator a feature series is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Rsi,
    WaveTrend,
    Cci,
    Adx,
}

impl FeatureKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::WaveTrend => "WT",
            Self::Cci => "CCI",
            Self::Adx => "ADX",
        }
    }

    /// Min-max normalized over the whole window rather than rescaled from
    /// fixed bounds. Every value of such a feature depends on the window.
    pub fn is_window_normalized(self) -> bool {
        matches!(self, Self::WaveTrend | Self::Cci)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FeatureKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RSI" => Ok(Self::Rsi),
            "WT" => Ok(Self::WaveTrend),
            "CCI" => Ok(Self::Cci),
            "ADX" => Ok(Self::Adx),
            other => Err(EngineError::config(format!("unknown feature: {other}"))),
        }
    }
}

/// Raw feature entry as written in a config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    pub kind: String,
    pub param_a: usize,
    #[serde(default = "default_param_b")]
    pub param_b: usize,
}

fn default_param_b() -> usize {
    1
}

impl FeatureConfig {
    pub fn new(kind: &str, param_a: usize, param_b: usize) -> Self {
        Self {
            kind: kind.to_string(),
            param_a,
            param_b,
        }
    }
}

/// A validated feature: indicator kind plus its two parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureSpec {
    pub kind: FeatureKind,
    pub param_a: usize,
    pub param_b: usize,
}

impl FeatureSpec {
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.kind.code().to_ascii_lowercase(),
            self.param_a,
            self.param_b
        )
    }

    fn from_config(config: &FeatureConfig) -> Result<Self> {
        let kind: FeatureKind = config.kind.parse()?;
        if config.param_a == 0 {
            return Err(EngineError::config(format!(
                "feature {kind}: param_a must be >= 1"
            )));
        }
        if config.param_b == 0 && kind != FeatureKind::Adx {
            return Err(EngineError::config(format!(
                "feature {kind}: param_b must be >= 1"
            )));
        }
        Ok(Self {
            kind,
            param_a: config.param_a,
            param_b: config.param_b,
        })
    }
}

// ─── Classification ──────────────────────────────────────────────────

/// Chronological down-sampling of classifier candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DownSampler {
    /// Every candidate is considered.
    Disabled,
    /// Only indices divisible by 4.
    #[default]
    EveryFourth,
    /// Only indices divisible by `every`.
    UseEvery { every: usize },
    /// Every index except those divisible by `every`.
    SkipEvery { every: usize },
}

impl DownSampler {
    /// Whether candidate `index` is kept.
    pub fn keeps(self, index: usize) -> bool {
        match self {
            Self::Disabled => true,
            Self::EveryFourth => index % 4 == 0,
            Self::UseEvery { every } => index % every == 0,
            Self::SkipEvery { every } => index % every != 0,
        }
    }

    fn validate(self) -> Result<Self> {
        match self {
            Self::UseEvery { every: 0 } => Err(EngineError::config(
                "down sampler use_every: every must be >= 1",
            )),
            Self::SkipEvery { every } if every < 2 => Err(EngineError::config(
                "down sampler skip_every: every must be >= 2",
            )),
            other => Ok(other),
        }
    }
}

/// Validated classifier configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationSettings {
    pub neighbors_count: usize,
    pub max_bars_back: usize,
    pub live_history_size: usize,
    pub use_remote_fractals: bool,
    /// `neighbors_count * prediction_threshold_percent / 100`.
    pub required_neighbors: f64,
    /// `round(neighbors_count * 3 / 4)`.
    pub last_distance_neighbors_count: usize,
    pub down_sampler: DownSampler,
}

impl ClassificationSettings {
    pub fn new(
        neighbors_count: usize,
        prediction_threshold_percent: f64,
        max_bars_back: usize,
        live_history_size: usize,
        use_remote_fractals: bool,
        down_sampler: DownSampler,
    ) -> Result<Self> {
        if neighbors_count < 1 {
            return Err(EngineError::config("neighbors_count must be >= 1"));
        }
        if max_bars_back < 1 {
            return Err(EngineError::config("max_bars_back must be >= 1"));
        }
        if !(0.0..=100.0).contains(&prediction_threshold_percent) {
            return Err(EngineError::config(format!(
                "prediction_threshold_percent must be within 0..=100, got {prediction_threshold_percent}"
            )));
        }
        Ok(Self {
            neighbors_count,
            max_bars_back,
            live_history_size,
            use_remote_fractals,
            required_neighbors: neighbors_count as f64 * prediction_threshold_percent / 100.0,
            last_distance_neighbors_count: (neighbors_count as f64 * 3.0 / 4.0).round() as usize,
            down_sampler: down_sampler.validate()?,
        })
    }
}

/// Raw classifier section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub neighbors_count: usize,
    pub prediction_threshold_percent: f64,
    pub max_bars_back: usize,
    pub live_history_size: usize,
    pub use_remote_fractals: bool,
    pub down_sampler: DownSampler,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            neighbors_count: 8,
            prediction_threshold_percent: 0.0,
            max_bars_back: 2000,
            live_history_size: 2000,
            use_remote_fractals: false,
            down_sampler: DownSampler::EveryFourth,
        }
    }
}

// ─── Filters ─────────────────────────────────────────────────────────

/// Toggles and parameters of the boolean filter pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterSettings {
    pub use_volatility_filter: bool,
    pub volatility_min_length: usize,
    pub volatility_max_length: usize,
    pub use_regime_filter: bool,
    pub regime_threshold: f64,
    pub use_adx_filter: bool,
    pub adx_length: usize,
    pub adx_threshold: f64,
    pub use_ema_filter: bool,
    pub ema_period: usize,
    pub use_sma_filter: bool,
    pub sma_period: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            use_volatility_filter: true,
            volatility_min_length: 1,
            volatility_max_length: 10,
            use_regime_filter: true,
            regime_threshold: -0.1,
            use_adx_filter: false,
            adx_length: 14,
            adx_threshold: 20.0,
            use_ema_filter: false,
            ema_period: 200,
            use_sma_filter: false,
            sma_period: 200,
        }
    }
}

impl FilterSettings {
    /// Everything off: every filter array is all-true.
    pub fn disabled() -> Self {
        Self {
            use_volatility_filter: false,
            use_regime_filter: false,
            use_adx_filter: false,
            use_ema_filter: false,
            use_sma_filter: false,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        let periods = [
            ("volatility_min_length", self.volatility_min_length),
            ("volatility_max_length", self.volatility_max_length),
            ("adx_length", self.adx_length),
            ("ema_period", self.ema_period),
            ("sma_period", self.sma_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(EngineError::config(format!("{name} must be >= 1")));
            }
        }
        Ok(())
    }
}

// ─── Kernel ──────────────────────────────────────────────────────────

/// Nadaraya-Watson kernel regression parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KernelSettings {
    pub use_kernel_filter: bool,
    pub use_kernel_smoothing: bool,
    pub lookback_window: usize,
    pub relative_weighting: f64,
    pub lag: usize,
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            use_kernel_filter: true,
            use_kernel_smoothing: false,
            lookback_window: 8,
            relative_weighting: 8.0,
            lag: 2,
        }
    }
}

impl KernelSettings {
    fn validate(&self) -> Result<()> {
        if self.lookback_window < 1 {
            return Err(EngineError::config("kernel lookback_window must be >= 1"));
        }
        if self.lag >= self.lookback_window {
            return Err(EngineError::config(format!(
                "kernel lag ({}) must be smaller than lookback_window ({})",
                self.lag, self.lookback_window
            )));
        }
        if !(self.relative_weighting > 0.0) {
            return Err(EngineError::config("kernel relative_weighting must be > 0"));
        }
        Ok(())
    }
}

// ─── Labels ──────────────────────────────────────────────────────────

/// How historical candles are labelled for training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum LabelPolicy {
    /// First of target/stop hit along the high/low path decides the label.
    WinningTrade { win_percent: f64, loss_percent: f64 },
    /// Compare the high/low `bars` candles later with the current close.
    InProfitAfterBars { bars: usize },
    /// Compare the close `bars` candles later with the current close.
    InProfitAfterBarsCloses { bars: usize },
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::InProfitAfterBarsCloses { bars: 4 }
    }
}

impl LabelPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WinningTrade { .. } => "winning_trade",
            Self::InProfitAfterBars { .. } => "in_profit_after_bars",
            Self::InProfitAfterBarsCloses { .. } => "in_profit_after_bars_closes",
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::WinningTrade {
                win_percent,
                loss_percent,
            } => {
                if !(win_percent > 0.0) || !(loss_percent > 0.0) {
                    return Err(EngineError::config(
                        "winning_trade: win_percent and loss_percent must be > 0",
                    ));
                }
                if loss_percent >= 100.0 || win_percent >= 100.0 {
                    return Err(EngineError::config(
                        "winning_trade: percentages must be < 100",
                    ));
                }
            }
            Self::InProfitAfterBars { bars } | Self::InProfitAfterBarsCloses { bars } => {
                if bars == 0 {
                    return Err(EngineError::config(format!("{}: bars must be >= 1", self.name())));
                }
            }
        }
        Ok(())
    }
}

// ─── Top-level config ────────────────────────────────────────────────

/// Serializable configuration for one classification context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LorentzianConfig {
    pub general: GeneralConfig,
    pub features: Vec<FeatureConfig>,
    pub filters: FilterSettings,
    pub kernel: KernelSettings,
    pub labels: LabelPolicy,
}

impl Default for LorentzianConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            features: vec![
                FeatureConfig::new("RSI", 14, 1),
                FeatureConfig::new("WT", 10, 11),
                FeatureConfig::new("CCI", 20, 1),
                FeatureConfig::new("ADX", 20, 2),
                FeatureConfig::new("RSI", 9, 1),
            ],
            filters: FilterSettings::default(),
            kernel: KernelSettings::default(),
            labels: LabelPolicy::default(),
        }
    }
}

impl LorentzianConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Validated, immutable settings. Only obtainable through [`Settings::from_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    classification: ClassificationSettings,
    features: Vec<FeatureSpec>,
    filters: FilterSettings,
    kernel: KernelSettings,
    labels: LabelPolicy,
    fingerprint: SettingsFingerprint,
}

impl Settings {
    pub fn from_config(config: &LorentzianConfig) -> Result<Self> {
        let general = &config.general;
        let classification = ClassificationSettings::new(
            general.neighbors_count,
            general.prediction_threshold_percent,
            general.max_bars_back,
            general.live_history_size,
            general.use_remote_fractals,
            general.down_sampler,
        )?;

        if !(MIN_FEATURES..=MAX_FEATURES).contains(&config.features.len()) {
            return Err(EngineError::config(format!(
                "feature count must be within {MIN_FEATURES}..={MAX_FEATURES}, got {}",
                config.features.len()
            )));
        }
        let features = config
            .features
            .iter()
            .map(FeatureSpec::from_config)
            .collect::<Result<Vec<_>>>()?;

        config.filters.validate()?;
        config.kernel.validate()?;
        config.labels.validate()?;

        Ok(Self {
            classification,
            features,
            filters: config.filters.clone(),
            kernel: config.kernel.clone(),
            labels: config.labels,
            fingerprint: SettingsFingerprint::of(config)?,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Self::from_config(&LorentzianConfig::from_toml_str(s)?)
    }

    pub fn classification(&self) -> &ClassificationSettings {
        &self.classification
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn filters(&self) -> &FilterSettings {
        &self.filters
    }

    pub fn kernel(&self) -> &KernelSettings {
        &self.kernel
    }

    pub fn labels(&self) -> &LabelPolicy {
        &self.labels
    }

    pub fn fingerprint(&self) -> &SettingsFingerprint {
        &self.fingerprint
    }
}
