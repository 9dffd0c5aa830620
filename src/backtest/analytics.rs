//! Backtest analytics and reporting

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// A completed round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRecord {
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    /// Units held while the position was open
    pub units: Decimal,
    /// Cash balance after the close
    pub balance: Decimal,
    /// Balance after the close minus the initial balance
    pub profit: Decimal,
    /// Price move from entry to exit, in percent
    pub return_pct: Decimal,
    /// Closed by end-of-run liquidation rather than a Sell signal
    pub forced: bool,
}

/// Mark-to-market equity after one observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
    /// Distance below the running peak, as a fraction
    pub drawdown: Decimal,
}

/// Backtest statistics
///
/// Built incrementally by the ledger. `win_rate` and
/// `average_profit_per_trade` only hold their final meaning after
/// finalization; during a run the latter is a running sum of percentages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BacktestResult {
    /// Positions opened (counted on open)
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Sum of per-close profits, each measured against the initial balance
    pub total_profit: Decimal,
    /// Largest peak-to-trough equity decline, as a fraction
    pub max_drawdown: Decimal,
    pub win_rate: Decimal,
    /// Mean entry-to-exit price move per trade, in percent
    pub average_profit_per_trade: Decimal,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    /// Observations dropped because their price did not parse
    pub skipped_observations: usize,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    /// Final balance relative to the initial balance, in percent
    pub fn return_pct(&self) -> Decimal {
        if self.initial_balance.is_zero() {
            return Decimal::ZERO;
        }
        (self.final_balance - self.initial_balance) / self.initial_balance * dec!(100)
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let period = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!(
                "{} → {}",
                start.format("%Y-%m-%d %H:%M"),
                end.format("%Y-%m-%d %H:%M")
            ),
            _ => "n/a".to_string(),
        };

        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════
Period:           {}

PERFORMANCE
───────────────────────────────────────────────────────
Initial Balance:  {:.2}
Final Balance:    {:.2} ({:+.2}%)
Total Profit:     {:+.2}
Max Drawdown:     {:.2}%
Win Rate:         {:.1}%
Avg Return/Trade: {:+.2}%

ACTIVITY
───────────────────────────────────────────────────────
Total Trades:     {}
Winning Trades:   {}
Losing Trades:    {}
Skipped Quotes:   {}
══════════════════════════════════════════════════════
"#,
            period,
            self.initial_balance,
            self.final_balance,
            self.return_pct(),
            self.total_profit,
            self.max_drawdown * dec!(100),
            self.win_rate * dec!(100),
            self.average_profit_per_trade,
            self.total_trades,
            self.winning_trades,
            self.losing_trades,
            self.skipped_observations,
        )
    }
}
