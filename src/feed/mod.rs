//! Price feed module
//!
//! Market-data sources that produce price observations, either one quote at a
//! time for live polling or as a chronological history for backtests.

mod http;
mod parquet;
mod replay;
mod types;

pub use http::{extract_price, HttpPriceSource, HttpSourceConfig};
pub use parquet::ParquetPriceSource;
pub use replay::ReplaySource;
pub use types::{parse_price, PriceObservation, PriceParseError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by price sources
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport or I/O failure
    #[error("request failed: {0}")]
    Request(String),
    /// Response did not contain a usable quote
    #[error("unexpected response: {0}")]
    Response(String),
    /// No data for the requested symbol
    #[error("no data for symbol {0}")]
    NoData(String),
    /// Replay has no more observations
    #[error("source exhausted")]
    Exhausted,
    /// Operation not offered by this source
    #[error("{0} is not supported by this source")]
    Unsupported(&'static str),
}

impl SourceError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Request(_) | SourceError::Response(_))
    }
}

/// Inclusive time window for historical queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl HistoryRange {
    /// Range with no bounds
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether a timestamp falls inside the range
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }
}

/// Trait for market-data sources
///
/// Histories must be returned in chronological order.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current quote for a symbol
    async fn fetch_price(&self, symbol: &str) -> Result<PriceObservation, SourceError>;

    /// Fetch the quotes for a symbol within a time range
    async fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<PriceObservation>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_unbounded_range_contains_everything() {
        let range = HistoryRange::all();
        assert!(range.contains(Utc::now()));
        assert!(range.contains(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn test_bounded_range_is_inclusive() {
        let start = Utc::now();
        let end = start + Duration::minutes(10);
        let range = HistoryRange {
            start: Some(start),
            end: Some(end),
        };

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(start - Duration::seconds(1)));
        assert!(!range.contains(end + Duration::seconds(1)));
    }

    #[test]
    fn test_transient_errors() {
        assert!(SourceError::Request("timeout".into()).is_transient());
        assert!(SourceError::Response("missing field".into()).is_transient());
        assert!(!SourceError::Exhausted.is_transient());
        assert!(!SourceError::Unsupported("history").is_transient());
    }
}
