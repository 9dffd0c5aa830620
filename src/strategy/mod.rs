//! Strategy module
//!
//! Stateful indicators that turn one price at a time into a trading signal

mod moving_average;
mod types;

pub use moving_average::{CrossoverConfig, MovingAverageCrossover};
pub use types::{Action, Signal};

use crate::feed::{PriceObservation, PriceParseError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Strategy construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("short period must be positive")]
    ZeroShortPeriod,
    #[error("short period {short} must be less than long period {long}")]
    PeriodOrder { short: usize, long: usize },
    #[error("threshold must be non-negative, got {0}")]
    NegativeThreshold(Decimal),
}

/// Trait for trading strategies
pub trait Strategy: Send {
    /// Short identifier used in logs and reports
    fn name(&self) -> &str;

    /// Consume one parsed price and produce a signal
    fn on_price(&mut self, price: Decimal) -> Signal;

    /// Consume one observation
    ///
    /// A price that fails to parse is returned as an error and leaves the
    /// strategy state untouched; callers treat it as Hold.
    fn analyze(&mut self, observation: &PriceObservation) -> Result<Signal, PriceParseError> {
        let price = observation.parse_price()?;
        Ok(self.on_price(price))
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_price(&mut self, price: Decimal) -> Signal {
        (**self).on_price(price)
    }

    fn analyze(&mut self, observation: &PriceObservation) -> Result<Signal, PriceParseError> {
        (**self).analyze(observation)
    }
}
