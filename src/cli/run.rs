//! Run command implementation

use crate::config::Config;
use crate::execution::ParquetOrderStore;
use crate::feed::{HistoryRange, HttpPriceSource, ParquetPriceSource, PriceSource, ReplaySource};
use crate::live::{LiveSettings, LiveTrader};
use crate::strategy::MovingAverageCrossover;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Replay recorded prices from Parquet instead of polling the quote endpoint
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Instrument code (default: feed.symbol)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Stop after this many polls
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Polling interval in milliseconds (default: live.polling_interval_secs)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Directory for placed orders (default: live.orders_dir)
    #[arg(long)]
    pub orders_dir: Option<PathBuf>,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut settings = LiveSettings::from_config(&config.feed, &config.live);
        if let Some(symbol) = &self.symbol {
            settings.symbol = symbol.clone();
        }
        if let Some(ms) = self.interval_ms {
            settings.polling_interval = Duration::from_millis(ms);
        }

        match &self.replay {
            Some(path) => {
                let history =
                    ParquetPriceSource::new(path).load(&settings.symbol, HistoryRange::all())?;
                tracing::info!(
                    path = %path.display(),
                    quotes = history.len(),
                    "Replaying recorded quotes"
                );
                self.trade(ReplaySource::new(history), settings, config).await
            }
            None => {
                if config.feed.url.is_empty() {
                    anyhow::bail!(
                        "feed.url is not configured; pass --replay to trade recorded data"
                    );
                }
                let source = HttpPriceSource::new(config.feed.http_source())?;
                self.trade(source, settings, config).await
            }
        }
    }

    async fn trade<P: PriceSource>(
        &self,
        source: P,
        settings: LiveSettings,
        config: &Config,
    ) -> anyhow::Result<()> {
        let orders_dir = self
            .orders_dir
            .clone()
            .unwrap_or_else(|| config.live.orders_dir.clone());
        let store = ParquetOrderStore::new(orders_dir);
        let strategy = MovingAverageCrossover::new(config.strategy.clone())?;
        config.backtest.validate()?;

        let mut trader =
            LiveTrader::new(source, strategy, store, settings, config.backtest.clone());
        trader.run(self.max_ticks).await
    }
}
