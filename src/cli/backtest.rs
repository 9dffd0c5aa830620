//! Backtest command implementation

use super::parse_time;
use crate::backtest::{BacktestResult, Backtester};
use crate::config::Config;
use crate::data::ParquetWriter;
use crate::feed::{HistoryRange, ParquetPriceSource, PriceSource};
use crate::strategy::MovingAverageCrossover;
use chrono::Utc;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Parquet file or directory of recorded prices (default: data.dir)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Instrument code (default: feed.symbol)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Start time filter (RFC 3339)
    #[arg(long)]
    pub start: Option<String>,

    /// End time filter (RFC 3339)
    #[arg(long)]
    pub end: Option<String>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Commission rate per side
    #[arg(long)]
    pub commission: Option<Decimal>,

    /// Output directory for trades and equity curve (default: data.output_dir)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl BacktestArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let data = self.data.clone().unwrap_or_else(|| config.data.dir.clone());
        let symbol = self.symbol.as_deref().unwrap_or(&config.feed.symbol);
        let range = HistoryRange {
            start: self.start.as_deref().map(parse_time).transpose()?,
            end: self.end.as_deref().map(parse_time).transpose()?,
        };

        let mut settings = config.backtest.clone();
        if let Some(capital) = self.capital {
            settings.initial_balance = capital;
        }
        if let Some(commission) = self.commission {
            settings.commission_rate = commission;
        }

        tracing::info!(data = %data.display(), symbol, "Loading price history");
        let series = ParquetPriceSource::new(&data)
            .fetch_history(symbol, range)
            .await?;

        let strategy = MovingAverageCrossover::new(config.strategy.clone())?;
        let result = Backtester::new(strategy, series, settings)?.run();

        match self.format {
            OutputFormat::Table => println!("{}", result.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        }

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| config.data.output_dir.clone());
        export(&result, &output)?;
        Ok(())
    }
}

/// Write trades and equity curve to Parquet
fn export(result: &BacktestResult, output: &Path) -> anyhow::Result<()> {
    let writer = ParquetWriter::new(output);
    let now = Utc::now();

    if !result.trades.is_empty() {
        let path = writer.file_path("trades", now);
        writer.write_trades(&path, &result.trades)?;
        tracing::info!(path = %path.display(), "Wrote trades");
    }
    if !result.equity_curve.is_empty() {
        let path = writer.file_path("equity", now);
        writer.write_equity_curve(&path, &result.equity_curve)?;
        tracing::info!(path = %path.display(), "Wrote equity curve");
    }
    Ok(())
}
