//! Single-instrument position ledger
//!
//! The all-in/all-out state machine shared by the backtester and the live
//! loop. A Buy while flat converts the whole balance to units, a Sell while
//! long converts every unit back to cash; any other combination is ignored.
//! Commission is charged proportionally on both legs.
//!
//! Arithmetic is checked throughout. A fill or mark whose value does not fit
//! in a `Decimal` is refused with a warning and leaves the ledger unchanged.

use super::{BacktestResult, BacktestSettings, EquityPoint, TradeRecord};
use crate::strategy::Action;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Current position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Long {
        entry_price: Decimal,
        units: Decimal,
        entry_time: DateTime<Utc>,
    },
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }
}

/// A position change caused by a signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Opened {
        price: Decimal,
        units: Decimal,
        timestamp: DateTime<Utc>,
    },
    Closed(TradeRecord),
}

/// Tracks cash, position and running statistics
#[derive(Debug, Clone)]
pub struct Ledger {
    settings: BacktestSettings,
    balance: Decimal,
    position: PositionState,
    peak_equity: Decimal,
    last_mark: Option<(Decimal, DateTime<Utc>)>,
    record_equity: bool,
    result: BacktestResult,
}

impl Ledger {
    /// Create a flat ledger holding the initial balance
    pub fn new(settings: BacktestSettings) -> Self {
        let result = BacktestResult {
            initial_balance: settings.initial_balance,
            final_balance: settings.initial_balance,
            ..Default::default()
        };
        Self {
            balance: settings.initial_balance,
            peak_equity: settings.initial_balance,
            settings,
            position: PositionState::Flat,
            last_mark: None,
            record_equity: true,
            result,
        }
    }

    /// Stop keeping the per-observation equity curve
    pub fn without_equity_curve(mut self) -> Self {
        self.record_equity = false;
        self
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn position(&self) -> PositionState {
        self.position
    }

    /// Statistics accumulated so far
    pub fn result(&self) -> &BacktestResult {
        &self.result
    }

    /// Mark-to-market value at a price, `None` if it does not fit
    pub fn equity_at(&self, price: Decimal) -> Option<Decimal> {
        match self.position {
            PositionState::Flat => Some(self.balance),
            PositionState::Long { units, .. } => units.checked_mul(price),
        }
    }

    /// Apply a signal at the given price
    pub fn apply(
        &mut self,
        action: Action,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Option<Transition> {
        match (action, self.position) {
            (Action::Buy, PositionState::Flat) => self.open(price, timestamp),
            (Action::Sell, PositionState::Long { .. }) => self
                .close(price, timestamp, false)
                .map(Transition::Closed),
            _ => None,
        }
    }

    fn open(&mut self, price: Decimal, timestamp: DateTime<Utc>) -> Option<Transition> {
        if price.is_zero() {
            tracing::warn!(%price, "Ignoring buy at zero price");
            return None;
        }
        let Some(units) = self
            .balance
            .checked_mul(Decimal::ONE - self.settings.commission_rate)
            .and_then(|spend| spend.checked_div(price))
        else {
            tracing::warn!(
                %price,
                balance = %self.balance,
                "Ignoring buy, position size out of range"
            );
            return None;
        };

        self.position = PositionState::Long {
            entry_price: price,
            units,
            entry_time: timestamp,
        };
        self.balance = Decimal::ZERO;
        self.result.total_trades += 1;

        Some(Transition::Opened {
            price,
            units,
            timestamp,
        })
    }

    fn close(
        &mut self,
        price: Decimal,
        timestamp: DateTime<Utc>,
        forced: bool,
    ) -> Option<TradeRecord> {
        let PositionState::Long {
            entry_price,
            units,
            entry_time,
        } = self.position
        else {
            return None;
        };

        let proceeds = units
            .checked_mul(price)
            .and_then(|value| value.checked_mul(Decimal::ONE - self.settings.commission_rate));
        // entry_price is never zero, opens at zero are refused
        let return_pct = (price - entry_price)
            .checked_div(entry_price)
            .and_then(|ratio| ratio.checked_mul(dec!(100)));
        let (Some(proceeds), Some(return_pct)) = (proceeds, return_pct) else {
            tracing::warn!(%price, %units, %entry_price, "Ignoring close, proceeds out of range");
            return None;
        };

        self.balance = proceeds;
        self.position = PositionState::Flat;

        let profit = self.balance - self.settings.initial_balance;
        if profit > Decimal::ZERO {
            self.result.winning_trades += 1;
        } else {
            self.result.losing_trades += 1;
        }
        self.result.total_profit = self.result.total_profit.saturating_add(profit);
        self.result.average_profit_per_trade =
            self.result.average_profit_per_trade.saturating_add(return_pct);
        self.result.final_balance = self.balance;

        let trade = TradeRecord {
            entry_time,
            exit_time: timestamp,
            entry_price,
            exit_price: price,
            units,
            balance: self.balance,
            profit,
            return_pct,
            forced,
        };
        self.result.trades.push(trade.clone());
        Some(trade)
    }

    /// Record equity and drawdown after an observation
    ///
    /// Returns `None` without recording anything when the equity does not fit.
    pub fn mark(&mut self, price: Decimal, timestamp: DateTime<Utc>) -> Option<EquityPoint> {
        let Some(equity) = self.equity_at(price) else {
            tracing::warn!(%price, "Equity out of range, observation not marked");
            return None;
        };
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }

        let drawdown = if self.peak_equity > Decimal::ZERO {
            (self.peak_equity - equity) / self.peak_equity
        } else {
            Decimal::ZERO
        };
        if drawdown > self.result.max_drawdown {
            self.result.max_drawdown = drawdown;
        }

        if self.result.start_date.is_none() {
            self.result.start_date = Some(timestamp);
        }
        self.result.end_date = Some(timestamp);
        self.last_mark = Some((price, timestamp));

        let point = EquityPoint {
            timestamp,
            equity,
            drawdown,
        };
        if self.record_equity {
            self.result.equity_curve.push(point.clone());
        }
        Some(point)
    }

    /// Count an observation that was dropped before reaching the ledger
    pub fn record_skip(&mut self) {
        self.result.skipped_observations += 1;
    }

    /// Liquidate an open position at the last marked price
    pub fn close_at_last_mark(&mut self) -> Option<TradeRecord> {
        let (price, timestamp) = self.last_mark?;
        self.close(price, timestamp, true)
    }

    /// Close any open position and compute the derived statistics
    pub fn finalize(mut self) -> BacktestResult {
        self.close_at_last_mark();

        let mut result = self.result;
        result.final_balance = self.balance;

        if result.total_trades > 0 {
            let total = Decimal::from(result.total_trades);
            result.win_rate = Decimal::from(result.winning_trades) / total;
            result.average_profit_per_trade /= total;
        }

        result
    }
}
