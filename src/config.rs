//! Configuration types for sma-trader

use crate::backtest::{BacktestError, BacktestSettings};
use crate::feed::HttpSourceConfig;
use crate::strategy::{CrossoverConfig, StrategyError};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid [strategy] section: {0}")]
    Strategy(#[from] StrategyError),
    #[error("invalid [backtest] section: {0}")]
    Backtest(#[from] BacktestError),
    #[error("invalid [live] section: {0}")]
    Live(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub strategy: CrossoverConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Market-data feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Instrument code
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Quote endpoint; `{symbol}` is substituted
    #[serde(default)]
    pub url: String,

    /// JSON pointer to the price in the quote response
    #[serde(default = "default_price_pointer")]
    pub price_pointer: String,

    /// Environment variable holding the bearer token
    #[serde(default)]
    pub token_env: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_symbol() -> String {
    "005930".to_string()
}
fn default_price_pointer() -> String {
    "/output/stck_prpr".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            url: String::new(),
            price_pointer: default_price_pointer(),
            token_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FeedConfig {
    /// Build the HTTP source settings, resolving the token from the environment
    pub fn http_source(&self) -> HttpSourceConfig {
        let token = self
            .token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|token| !token.is_empty());

        HttpSourceConfig {
            url: self.url.clone(),
            price_pointer: self.price_pointer.clone(),
            token,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Live polling loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// Seconds between quote polls
    #[serde(default = "default_polling_interval_secs")]
    pub polling_interval_secs: u64,

    /// Extra attempts after a failed fetch
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Where placed orders are written
    #[serde(default = "default_orders_dir")]
    pub orders_dir: PathBuf,
}

fn default_polling_interval_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_secs() -> u64 {
    5
}
fn default_orders_dir() -> PathBuf {
    PathBuf::from("./orders")
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            polling_interval_secs: default_polling_interval_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            orders_dir: default_orders_dir(),
        }
    }
}

impl LiveConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

/// Data storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Captured price history
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// Backtest reports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus listener port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.backtest.validate()?;
        if self.live.polling_interval_secs == 0 {
            return Err(ConfigError::Live(
                "polling_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
