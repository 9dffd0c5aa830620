//! Replay event hooks

use super::{BacktestResult, Transition};
use crate::feed::{PriceObservation, PriceParseError};
use crate::strategy::Signal;
use crate::telemetry;

/// Receives events while a series is replayed
///
/// All methods default to doing nothing.
pub trait ReplayObserver {
    /// An observation was dropped because its price did not parse
    fn on_skipped(
        &mut self,
        _index: usize,
        _observation: &PriceObservation,
        _error: &PriceParseError,
    ) {
    }

    /// The strategy produced a signal
    fn on_signal(&mut self, _index: usize, _observation: &PriceObservation, _signal: &Signal) {}

    /// The ledger opened or closed a position
    fn on_transition(&mut self, _transition: &Transition) {}

    /// The run was finalized
    fn on_finished(&mut self, _result: &BacktestResult) {}
}

impl<O: ReplayObserver + ?Sized> ReplayObserver for &mut O {
    fn on_skipped(&mut self, index: usize, observation: &PriceObservation, error: &PriceParseError) {
        (**self).on_skipped(index, observation, error)
    }

    fn on_signal(&mut self, index: usize, observation: &PriceObservation, signal: &Signal) {
        (**self).on_signal(index, observation, signal)
    }

    fn on_transition(&mut self, transition: &Transition) {
        (**self).on_transition(transition)
    }

    fn on_finished(&mut self, result: &BacktestResult) {
        (**self).on_finished(result)
    }
}

/// Logs replay events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReplayObserver for TracingObserver {
    fn on_skipped(&mut self, index: usize, observation: &PriceObservation, error: &PriceParseError) {
        telemetry::record_skipped_observation();
        tracing::warn!(
            index,
            symbol = %observation.symbol,
            timestamp = %observation.timestamp,
            error = %error,
            "Skipping observation with unparsable price"
        );
    }

    fn on_transition(&mut self, transition: &Transition) {
        match transition {
            Transition::Opened {
                price,
                units,
                timestamp,
            } => {
                tracing::info!(%price, %units, %timestamp, "Opened position");
            }
            Transition::Closed(trade) => {
                tracing::info!(
                    exit_price = %trade.exit_price,
                    balance = %trade.balance.round_dp(2),
                    profit = %trade.profit.round_dp(2),
                    return_pct = %trade.return_pct.round_dp(2),
                    forced = trade.forced,
                    "Closed position"
                );
            }
        }
    }

    fn on_finished(&mut self, result: &BacktestResult) {
        tracing::info!(
            total_trades = result.total_trades,
            win_rate = %result.win_rate.round_dp(4),
            max_drawdown = %result.max_drawdown.round_dp(4),
            final_balance = %result.final_balance.round_dp(2),
            "Backtest finished"
        );
    }
}
