//! Capture command implementation

use crate::config::Config;
use crate::data::ParquetWriter;
use crate::feed::{HttpPriceSource, PriceObservation, PriceSource};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Output directory for captured data (default: data.dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Instrument code (default: feed.symbol)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Stop after this many quotes
    #[arg(long)]
    pub count: Option<usize>,

    /// Quotes buffered before a file is written
    #[arg(long, default_value = "100")]
    pub flush_every: usize,
}

impl CaptureArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if config.feed.url.is_empty() {
            anyhow::bail!("feed.url is not configured");
        }
        let source = HttpPriceSource::new(config.feed.http_source())?;
        let symbol = self.symbol.as_deref().unwrap_or(&config.feed.symbol);
        let output = self.output.clone().unwrap_or_else(|| config.data.dir.clone());

        let recorder = Recorder::new(ParquetWriter::new(output), self.flush_every);
        capture(
            &source,
            symbol,
            config.live.polling_interval(),
            self.count,
            recorder,
        )
        .await
    }
}

/// Buffers quotes and writes them out in batches
struct Recorder {
    writer: ParquetWriter,
    buffer: Vec<PriceObservation>,
    flush_every: usize,
    written: usize,
}

impl Recorder {
    fn new(writer: ParquetWriter, flush_every: usize) -> Self {
        Self {
            writer,
            buffer: Vec::new(),
            flush_every: flush_every.max(1),
            written: 0,
        }
    }

    fn push(&mut self, observation: PriceObservation) -> anyhow::Result<()> {
        self.buffer.push(observation);
        if self.buffer.len() >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        let Some(first) = self.buffer.first() else {
            return Ok(());
        };
        let path = self.writer.file_path("prices", first.timestamp);
        self.writer.write_observations(&path, &self.buffer)?;

        tracing::info!(path = %path.display(), count = self.buffer.len(), "Flushed quotes");
        self.written += self.buffer.len();
        self.buffer.clear();
        Ok(())
    }
}

/// Poll `source` until Ctrl-C or `count` quotes, recording every quote
async fn capture<P: PriceSource>(
    source: &P,
    symbol: &str,
    period: Duration,
    count: Option<usize>,
    mut recorder: Recorder,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(symbol, output = %recorder.writer.output_dir().display(), "Starting capture");
    let mut captured = 0;

    while count.map_or(true, |max| captured < max) {
        tokio::select! {
            _ = interval.tick() => {
                match source.fetch_price(symbol).await {
                    Ok(observation) => {
                        tracing::debug!(price = %observation.price, "Captured quote");
                        recorder.push(observation)?;
                        captured += 1;
                    }
                    Err(e) if e.is_transient() => {
                        tracing::warn!(error = %e, "Quote fetch failed");
                    }
                    Err(e) => {
                        tracing::info!(reason = %e, "Capture source finished");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    recorder.flush()?;
    tracing::info!(
        captured,
        written = recorder.written,
        at = %Utc::now(),
        "Capture stopped"
    );
    Ok(())
}
