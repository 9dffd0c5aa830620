//! In-memory replay source

use super::{HistoryRange, PriceObservation, PriceSource, SourceError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves a pre-loaded series of observations
///
/// `fetch_price` walks the series one observation per call, which lets the
/// live loop be driven from recorded data.
pub struct ReplaySource {
    observations: Vec<PriceObservation>,
    cursor: AtomicUsize,
}

impl ReplaySource {
    /// Create a replay over the given observations
    pub fn new(observations: Vec<PriceObservation>) -> Self {
        Self {
            observations,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of observations not yet served by `fetch_price`
    pub fn remaining(&self) -> usize {
        self.observations
            .len()
            .saturating_sub(self.cursor.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl PriceSource for ReplaySource {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceObservation, SourceError> {
        loop {
            let index = self.cursor.fetch_add(1, Ordering::SeqCst);
            match self.observations.get(index) {
                Some(obs) if obs.symbol == symbol => return Ok(obs.clone()),
                Some(_) => continue,
                None => {
                    self.cursor.store(self.observations.len(), Ordering::SeqCst);
                    return Err(SourceError::Exhausted);
                }
            }
        }
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<PriceObservation>, SourceError> {
        let history: Vec<PriceObservation> = self
            .observations
            .iter()
            .filter(|obs| obs.symbol == symbol && range.contains(obs.timestamp))
            .cloned()
            .collect();

        if history.is_empty() {
            return Err(SourceError::NoData(symbol.to_string()));
        }
        Ok(history)
    }
}
