//! Live trading module
//!
//! Polls a price source on a fixed interval, feeds the strategy and records a
//! paper fill for every position change

mod trader;

pub use trader::{LiveSettings, LiveTrader, TickOutcome};

use crate::config::{FeedConfig, LiveConfig};

impl LiveSettings {
    /// Settings from the `[feed]` and `[live]` config sections
    pub fn from_config(feed: &FeedConfig, live: &LiveConfig) -> Self {
        Self {
            symbol: feed.symbol.clone(),
            polling_interval: live.polling_interval(),
            max_retries: live.max_retries,
            retry_delay: live.retry_delay(),
        }
    }
}

