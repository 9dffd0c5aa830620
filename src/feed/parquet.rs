//! Historical price source backed by Parquet files

use super::{HistoryRange, PriceObservation, PriceSource, SourceError};
use crate::data::ParquetReader;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads recorded observations from a Parquet file or a directory of them
pub struct ParquetPriceSource {
    path: PathBuf,
}

impl ParquetPriceSource {
    /// Create a source over a file or directory
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn files(&self) -> Result<Vec<PathBuf>, SourceError> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let entries = std::fs::read_dir(&self.path)
            .map_err(|e| SourceError::Request(format!("{}: {}", self.path.display(), e)))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_parquet(p))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Load every observation for a symbol in range, oldest first
    pub fn load(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<PriceObservation>, SourceError> {
        let mut observations = Vec::new();

        for file in self.files()? {
            let batch = ParquetReader::new(&file)
                .read_observations()
                .map_err(|e| SourceError::Request(format!("{}: {}", file.display(), e)))?;
            observations.extend(
                batch
                    .into_iter()
                    .filter(|obs| obs.symbol == symbol && range.contains(obs.timestamp)),
            );
        }

        if observations.is_empty() {
            return Err(SourceError::NoData(symbol.to_string()));
        }

        // stable, so equal timestamps keep file order
        observations.sort_by_key(|obs| obs.timestamp);

        tracing::debug!(
            path = %self.path.display(),
            symbol,
            count = observations.len(),
            "Loaded price history"
        );
        Ok(observations)
    }
}

fn is_parquet(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "parquet")
}

#[async_trait]
impl PriceSource for ParquetPriceSource {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceObservation, SourceError> {
        self.load(symbol, HistoryRange::all())?
            .pop()
            .ok_or_else(|| SourceError::NoData(symbol.to_string()))
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<PriceObservation>, SourceError> {
        self.load(symbol, range)
    }
}
