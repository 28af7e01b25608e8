//! Configuration loading for the simulator
//!
//! Supports JSON configuration files for:
//! - Trade probability and starting balances
//! - Roster size (trend followers, random traders)
//! - Strategy windows
//! - Initial instruments
//! - History bound, flush threshold, RNG seed

use bourse_core::AssetHistory;
use bourse_strategy::StrategyParams;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Chance, per account per tick, that the account's strategy runs
    #[serde(default = "default_trade_probability")]
    pub trade_probability: f64,

    /// Starting cash of synthesized accounts
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,

    /// Trend followers created at bootstrap (`TrendFollower_{i}`)
    #[serde(default = "default_roster_size")]
    pub num_trend_followers: usize,

    /// Random traders created at bootstrap (`RandomTrader_{i}`)
    #[serde(default = "default_roster_size")]
    pub num_random_traders: usize,

    /// Moving-average windows
    #[serde(flatten)]
    pub windows: StrategyParams,

    /// Asset-history samples retained per account
    #[serde(default = "default_asset_history_cap")]
    pub asset_history_cap: usize,

    /// Queued writes that trigger a storage flush
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,

    /// Fixed RNG seed; fresh entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Instruments listed when storage has none
    #[serde(default = "default_instruments")]
    pub instruments: Vec<InstrumentConfig>,
}

/// Instrument to list at bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub code: String,
    pub price: Decimal,
    pub volatility: Decimal,
}

impl InstrumentConfig {
    pub fn new(code: &str, price: Decimal, volatility: Decimal) -> Self {
        Self {
            code: code.to_string(),
            price,
            volatility,
        }
    }
}

fn default_trade_probability() -> f64 {
    0.1
}

fn default_initial_balance() -> Decimal {
    dec!(10000)
}

fn default_roster_size() -> usize {
    5
}

fn default_asset_history_cap() -> usize {
    AssetHistory::DEFAULT_CAPACITY
}

fn default_flush_threshold() -> usize {
    100
}

fn default_instruments() -> Vec<InstrumentConfig> {
    vec![
        InstrumentConfig::new("AAPL", dec!(150.0), dec!(0.02)),
        InstrumentConfig::new("GOOG", dec!(270.0), dec!(0.015)),
        InstrumentConfig::new("MSFT", dec!(300.0), dec!(0.025)),
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trade_probability: default_trade_probability(),
            initial_balance: default_initial_balance(),
            num_trend_followers: default_roster_size(),
            num_random_traders: default_roster_size(),
            windows: StrategyParams::default(),
            asset_history_cap: default_asset_history_cap(),
            flush_threshold: default_flush_threshold(),
            seed: None,
            instruments: default_instruments(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and window ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.trade_probability) {
            return Err(ConfigError::Invalid(format!(
                "trade_probability must be in [0, 1], got {}",
                self.trade_probability
            )));
        }
        if self.initial_balance < Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "initial_balance must not be negative, got {}",
                self.initial_balance
            )));
        }
        let w = &self.windows;
        if w.short_window == 0 || w.long_window == 0 || w.trend_window == 0 || w.reversion_window == 0
        {
            return Err(ConfigError::Invalid("windows must be positive".to_string()));
        }
        if w.short_window >= w.long_window {
            return Err(ConfigError::Invalid(format!(
                "short_window ({}) must be below long_window ({})",
                w.short_window, w.long_window
            )));
        }
        if self.asset_history_cap == 0 {
            return Err(ConfigError::Invalid("asset_history_cap must be positive".to_string()));
        }
        if self.flush_threshold == 0 {
            return Err(ConfigError::Invalid("flush_threshold must be positive".to_string()));
        }
        Ok(())
    }

    /// Builder: fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
