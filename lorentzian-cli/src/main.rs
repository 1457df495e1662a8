//! Lorentzian CLI - run the classification pipeline over a CSV candle file.
//!
//! Commands:
//! - `run` - classify a candle window and print the latest signal as JSON
//! - `check-config` - validate a TOML settings file
//! - `default-config` - print the default settings as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lorentzian_core::{
    Candle, CandleSignal, Candles, ContextKey, ContextRegistry, LorentzianConfig, Pipeline,
    PipelineOutput, Settings,
};

#[derive(Parser)]
#[command(
    name = "lorentzian",
    about = "Lorentzian classification - nearest-neighbor signals from OHLCV candles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a candle window and print the result as JSON.
    Run {
        /// CSV file with columns time,open,high,low,close,volume (oldest first).
        #[arg(long)]
        candles: PathBuf,

        /// TOML settings file. Defaults to the built-in settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbol the candles belong to.
        #[arg(long, default_value = "UNKNOWN")]
        symbol: String,

        /// Time frame of the candles (e.g., 1h, 15m).
        #[arg(long, default_value = "1h")]
        time_frame: String,

        /// Print every output array instead of the last candle only.
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// Validate a TOML settings file.
    CheckConfig {
        /// Path to the TOML settings file.
        path: PathBuf,
    },
    /// Print the default settings as TOML.
    DefaultConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            candles,
            config,
            symbol,
            time_frame,
            full,
        } => run_cmd(&candles, config.as_deref(), symbol, time_frame, full),
        Commands::CheckConfig { path } => check_config_cmd(&path),
        Commands::DefaultConfig => default_config_cmd(),
    }
}

/// Last-candle summary printed by `run`.
#[derive(Serialize)]
struct RunReport<'a> {
    symbol: &'a str,
    time_frame: &'a str,
    fingerprint: String,
    candles: usize,
    aligned: usize,
    last_time: Option<f64>,
    last_prediction: Option<i64>,
    #[serde(flatten)]
    last_signal: CandleSignal,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a PipelineOutput>,
}

fn run_cmd(
    candles_path: &Path,
    config_path: Option<&Path>,
    symbol: String,
    time_frame: String,
    full: bool,
) -> Result<()> {
    let settings = load_settings(config_path)?;
    let candles = load_candles(candles_path)?;
    info!(
        path = %candles_path.display(),
        candles = candles.len(),
        fingerprint = %settings.fingerprint(),
        "loaded inputs"
    );

    let fingerprint = settings.fingerprint().to_string();
    let mut registry = ContextRegistry::new(settings);
    let key = ContextKey::new(symbol, time_frame);
    let output = registry
        .rebuild(&key, &candles)
        .with_context(|| format!("classifying {key}"))?;

    let report = RunReport {
        symbol: &key.symbol,
        time_frame: &key.time_frame,
        fingerprint,
        candles: candles.len(),
        aligned: output.len(),
        last_time: output.time.last().copied(),
        last_prediction: output.last_prediction(),
        last_signal: output.last_signal().unwrap_or_default(),
        output: full.then_some(&output),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn check_config_cmd(path: &Path) -> Result<()> {
    let settings = load_settings(Some(path))?;
    let features: Vec<String> = settings.features().iter().map(|f| f.name()).collect();
    let pipeline = Pipeline::new(settings);

    println!("Config OK: {}", path.display());
    println!("Fingerprint:    {}", pipeline.settings().fingerprint());
    println!("Features:       {}", features.join(", "));
    println!("Labels:         {}", pipeline.settings().labels().name());
    println!("Min candles:    {}", pipeline.min_candles());
    Ok(())
}

fn default_config_cmd() -> Result<()> {
    let text = toml::to_string_pretty(&LorentzianConfig::default())
        .context("serializing default settings")?;
    print!("{text}");
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::from_config(&LorentzianConfig::default())?);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    Settings::from_toml_str(&text).with_context(|| format!("invalid settings in {}", path.display()))
}

/// Read candles from CSV, dropping rows whose OHLC values are inconsistent.
fn load_candles(path: &Path) -> Result<Candles> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening candle file {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<Candle>().enumerate() {
        let candle = record.with_context(|| format!("parsing candle row {}", line + 1))?;
        if candle.is_sane() {
            rows.push(candle);
        } else {
            warn!(row = line + 1, time = candle.time, "skipping inconsistent candle");
        }
    }
    if rows.is_empty() {
        bail!("no usable candles in {}", path.display());
    }
    Ok(Candles::from_candles(&rows))
}
