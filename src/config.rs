//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default, so a missing file or a partial file both
//! yield a working configuration; the defaults match the empirical
//! click timings the target tables were tuned against.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::executor::ExecutorConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub table: TableConfig,
    pub timing: TimingConfig,
}

/// Which layout record to use and how large a bet to accept.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TableConfig {
    pub layout_path: String,
    pub max_bet: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            layout_path: "table_layout.json".to_string(),
            max_bet: 100_000_000,
        }
    }
}

/// Click pacing, in milliseconds, plus the cancel press count.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimingConfig {
    pub chip_to_area_ms: u64,
    pub between_chips_ms: u64,
    pub cancel_interval_ms: u64,
    pub cancel_presses: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            chip_to_area_ms: 200,
            between_chips_ms: 150,
            cancel_interval_ms: 250,
            cancel_presses: 20,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load `path` if it exists; otherwise fall back to the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// The executor's view of this configuration.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            chip_to_area_delay: Duration::from_millis(self.timing.chip_to_area_ms),
            between_chips_delay: Duration::from_millis(self.timing.between_chips_ms),
            cancel_click_delay: Duration::from_millis(self.timing.cancel_interval_ms),
            cancel_presses: self.timing.cancel_presses,
            max_bet: self.table.max_bet,
        }
    }
}
