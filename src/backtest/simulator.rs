//! Backtest simulator engine

use super::{
    BacktestError, BacktestResult, BacktestSettings, Ledger, ReplayObserver, TracingObserver,
    Transition,
};
use crate::feed::PriceObservation;
use crate::strategy::Strategy;

/// Replays a price series through a strategy
///
/// The series must already be in chronological order; it is never re-sorted.
pub struct Backtester<S, O = TracingObserver> {
    strategy: S,
    series: Vec<PriceObservation>,
    settings: BacktestSettings,
    observer: O,
}

impl<S: Strategy> Backtester<S> {
    /// Create a new backtester, rejecting invalid account settings
    pub fn new(
        strategy: S,
        series: Vec<PriceObservation>,
        settings: BacktestSettings,
    ) -> Result<Self, BacktestError> {
        settings.validate()?;
        Ok(Self {
            strategy,
            series,
            settings,
            observer: TracingObserver,
        })
    }
}

impl<S: Strategy, O: ReplayObserver> Backtester<S, O> {
    /// Replace the event observer
    pub fn with_observer<P: ReplayObserver>(self, observer: P) -> Backtester<S, P> {
        Backtester {
            strategy: self.strategy,
            series: self.series,
            settings: self.settings,
            observer,
        }
    }

    /// Run the backtest to completion
    pub fn run(mut self) -> BacktestResult {
        let mut ledger = Ledger::new(self.settings.clone());

        tracing::info!(
            strategy = self.strategy.name(),
            observations = self.series.len(),
            initial_balance = %self.settings.initial_balance,
            commission_rate = %self.settings.commission_rate,
            "Starting backtest"
        );

        for (index, observation) in self.series.iter().enumerate() {
            let price = match observation.parse_price() {
                Ok(price) => price,
                Err(err) => {
                    ledger.record_skip();
                    self.observer.on_skipped(index, observation, &err);
                    continue;
                }
            };

            let signal = self.strategy.on_price(price);
            self.observer.on_signal(index, observation, &signal);

            if let Some(transition) = ledger.apply(signal.action, price, observation.timestamp) {
                self.observer.on_transition(&transition);
            }

            ledger.mark(price, observation.timestamp);
        }

        if let Some(trade) = ledger.close_at_last_mark() {
            self.observer.on_transition(&Transition::Closed(trade));
        }

        let result = ledger.finalize();
        self.observer.on_finished(&result);
        result
    }
}
