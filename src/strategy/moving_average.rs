//! Dual simple-moving-average crossover
//!
//! Keeps a rolling window of the last `long_period` prices. Once the window is
//! full, the short SMA over the newest `short_period` prices is compared with
//! the long SMA over the whole window, with a symmetric threshold band that
//! suppresses signals while the averages sit close together.

use super::{Signal, Strategy, StrategyError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::VecDeque;

/// Configuration for the crossover strategy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrossoverConfig {
    /// Short SMA lookback
    #[serde(default = "default_short_period")]
    pub short_period: usize,

    /// Long SMA lookback, also the window size
    #[serde(default = "default_long_period")]
    pub long_period: usize,

    /// Band around the long SMA as a fraction (0.01 = 1%)
    #[serde(default = "default_threshold")]
    pub threshold: Decimal,
}

fn default_short_period() -> usize {
    5
}
fn default_long_period() -> usize {
    10
}
fn default_threshold() -> Decimal {
    Decimal::new(1, 2) // 0.01 = 1%
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 10,
            threshold: Decimal::new(1, 2),
        }
    }
}

impl CrossoverConfig {
    /// Check the period ordering and threshold sign
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.short_period == 0 {
            return Err(StrategyError::ZeroShortPeriod);
        }
        if self.short_period >= self.long_period {
            return Err(StrategyError::PeriodOrder {
                short: self.short_period,
                long: self.long_period,
            });
        }
        if self.threshold.is_sign_negative() && !self.threshold.is_zero() {
            return Err(StrategyError::NegativeThreshold(self.threshold));
        }
        Ok(())
    }
}

/// Moving-average crossover strategy
#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    config: CrossoverConfig,
    history: VecDeque<Decimal>,
    short_sma: Option<Decimal>,
    long_sma: Option<Decimal>,
}

impl MovingAverageCrossover {
    /// Create a new strategy, rejecting invalid configurations
    pub fn new(config: CrossoverConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let capacity = config.long_period + 1;
        Ok(Self {
            config,
            history: VecDeque::with_capacity(capacity),
            short_sma: None,
            long_sma: None,
        })
    }

    /// Prices currently in the window, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Decimal> {
        self.history.iter()
    }

    /// Whether the window is full
    pub fn is_ready(&self) -> bool {
        self.history.len() >= self.config.long_period
    }

    /// Short SMA from the last full-window evaluation
    pub fn short_sma(&self) -> Option<Decimal> {
        self.short_sma
    }

    /// Long SMA from the last full-window evaluation
    pub fn long_sma(&self) -> Option<Decimal> {
        self.long_sma
    }

    /// Mean of the newest `period` prices, `None` if the sum does not fit
    fn tail_mean(&self, period: usize) -> Option<Decimal> {
        if period == 0 || self.history.len() < period {
            return None;
        }
        self.history
            .range(self.history.len() - period..)
            .try_fold(Decimal::ZERO, |sum, price| sum.checked_add(*price))
            .map(|sum| sum / Decimal::from(period))
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn on_price(&mut self, price: Decimal) -> Signal {
        self.history.push_back(price);
        if self.history.len() > self.config.long_period {
            self.history.pop_front();
        }

        if !self.is_ready() {
            tracing::trace!(
                samples = self.history.len(),
                required = self.config.long_period,
                "Not enough data for moving averages"
            );
            return Signal::hold();
        }

        let (Some(short), Some(long)) = (
            self.tail_mean(self.config.short_period),
            self.tail_mean(self.config.long_period),
        ) else {
            tracing::warn!(%price, "Moving average out of range, holding");
            return Signal::hold();
        };
        self.short_sma = Some(short);
        self.long_sma = Some(long);

        // a band edge that overflows lies beyond any representable short SMA
        let threshold = self.config.threshold;
        let upper = Decimal::ONE
            .checked_add(threshold)
            .and_then(|factor| long.checked_mul(factor));
        let lower = Decimal::ONE
            .checked_sub(threshold)
            .and_then(|factor| long.checked_mul(factor));

        let signal = if upper.is_some_and(|upper| short > upper) {
            Signal::buy(Decimal::ONE)
        } else if lower.is_some_and(|lower| short < lower) {
            Signal::sell(Decimal::ONE)
        } else {
            Signal::hold()
        };

        tracing::debug!(
            %price,
            short_sma = %short.round_dp(4),
            long_sma = %long.round_dp(4),
            action = %signal.action,
            "Moving averages updated"
        );
        signal
    }
}
