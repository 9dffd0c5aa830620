//! Backtesting module
//!
//! Replays a historical price series through a strategy and a single-position
//! ledger, producing aggregate performance statistics

mod analytics;
mod ledger;
mod observer;
mod simulator;

pub use analytics::{BacktestResult, EquityPoint, TradeRecord};
pub use ledger::{Ledger, PositionState, Transition};
pub use observer::{ReplayObserver, TracingObserver};
pub use simulator::Backtester;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Backtest construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestError {
    #[error("initial balance must be positive, got {0}")]
    InvalidInitialBalance(Decimal),
    #[error("commission rate must be in [0, 1), got {0}")]
    InvalidCommissionRate(Decimal),
}

/// Account settings for a simulation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BacktestSettings {
    /// Starting cash balance
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,

    /// Proportional commission charged on every open and every close
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,
}

fn default_initial_balance() -> Decimal {
    Decimal::new(10_000_000, 0)
}
fn default_commission_rate() -> Decimal {
    Decimal::new(25, 4) // 0.0025 = 0.25%
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            commission_rate: default_commission_rate(),
        }
    }
}

impl BacktestSettings {
    /// Check balance and commission bounds
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(BacktestError::InvalidInitialBalance(self.initial_balance));
        }
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(BacktestError::InvalidCommissionRate(self.commission_rate));
        }
        Ok(())
    }
}
