//! CLI interface for sma-trader
//!
//! Provides subcommands for:
//! - `backtest`: Replay recorded prices through the strategy
//! - `run`: Poll quotes and paper trade
//! - `capture`: Record quotes to Parquet (no trading)
//! - `config`: Show the effective configuration

mod backtest;
mod capture;
mod run;

pub use backtest::{BacktestArgs, OutputFormat};
pub use capture::CaptureArgs;
pub use run::RunArgs;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sma-trader")]
#[command(about = "Moving-average crossover trading client and backtester")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a backtest on recorded prices
    Backtest(BacktestArgs),
    /// Start the live paper trading loop
    Run(RunArgs),
    /// Record quotes only (no trading)
    Capture(CaptureArgs),
    /// Show configuration
    Config,
}

/// Parse an RFC 3339 timestamp argument
fn parse_time(text: &str) -> anyhow::Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .map_err(|e| anyhow::anyhow!("invalid timestamp {:?}: {}", text, e))?;
    Ok(parsed.with_timezone(&Utc))
}
