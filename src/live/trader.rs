//! Polling trade loop

use crate::backtest::{
    BacktestResult, BacktestSettings, Ledger, PositionState, TradeRecord, Transition,
};
use crate::execution::{Order, OrderSide, OrderStore, StoreError};
use crate::feed::{PriceObservation, PriceParseError, PriceSource, SourceError};
use crate::strategy::{Action, Strategy};
use crate::telemetry::{self, GaugeMetric};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use std::time::Duration;

/// Polling and retry settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSettings {
    pub symbol: String,
    pub polling_interval: Duration,
    /// Extra attempts after a transient fetch failure
    pub max_retries: u32,
    pub retry_delay: Duration,
}

/// What happened during one poll
#[derive(Debug)]
pub enum TickOutcome {
    /// Quote processed without a position change
    Signal { price: Decimal, action: Action },
    /// A position was opened and the order saved
    Opened(Order),
    /// A position was closed and the order saved
    Closed { order: Order, trade: TradeRecord },
    /// Quote arrived but its price did not parse
    Skipped(PriceParseError),
    /// No quote after all retries
    Unavailable(SourceError),
    /// The source has nothing more to give
    Exhausted,
}

/// Runs a strategy against a live price source
pub struct LiveTrader<P, S, O> {
    source: P,
    strategy: S,
    store: O,
    settings: LiveSettings,
    ledger: Ledger,
    ticks: u64,
}

impl<P: PriceSource, S: Strategy, O: OrderStore> LiveTrader<P, S, O> {
    pub fn new(
        source: P,
        strategy: S,
        store: O,
        settings: LiveSettings,
        account: BacktestSettings,
    ) -> Self {
        Self {
            source,
            strategy,
            store,
            settings,
            ledger: Ledger::new(account).without_equity_curve(),
            ticks: 0,
        }
    }

    pub fn position(&self) -> PositionState {
        self.ledger.position()
    }

    pub fn balance(&self) -> Decimal {
        self.ledger.balance()
    }

    /// Statistics accumulated so far
    pub fn stats(&self) -> &BacktestResult {
        self.ledger.result()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn store(&self) -> &O {
        &self.store
    }

    /// Fetch a quote, retrying transient failures
    async fn fetch_with_retry(&self) -> Result<PriceObservation, SourceError> {
        let mut attempt = 0;
        loop {
            match self.source.fetch_price(&self.settings.symbol).await {
                Ok(observation) => return Ok(observation),
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    telemetry::record_fetch_failure();
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_retries = self.settings.max_retries,
                        "Price fetch failed, retrying"
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        telemetry::record_fetch_failure();
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Poll once and act on the quote
    ///
    /// Only a failure to save an order is returned as an error; the ledger has
    /// already moved when that happens.
    pub async fn tick(&mut self) -> Result<TickOutcome, StoreError> {
        let fetched = self.fetch_with_retry().await;
        self.handle(fetched).await
    }

    async fn handle(
        &mut self,
        fetched: Result<PriceObservation, SourceError>,
    ) -> Result<TickOutcome, StoreError> {
        self.ticks += 1;

        let observation = match fetched {
            Ok(observation) => observation,
            Err(SourceError::Exhausted) => return Ok(TickOutcome::Exhausted),
            Err(e) => {
                tracing::error!(error = %e, symbol = %self.settings.symbol, "No quote available");
                return Ok(TickOutcome::Unavailable(e));
            }
        };

        let price = match observation.parse_price() {
            Ok(price) => price,
            Err(e) => {
                self.ledger.record_skip();
                telemetry::record_skipped_observation();
                tracing::warn!(
                    error = %e,
                    price = %observation.price,
                    "Skipping quote with unparsable price"
                );
                return Ok(TickOutcome::Skipped(e));
            }
        };

        let signal = self.strategy.on_price(price);
        telemetry::record_signal(signal.action);

        let transition = self.ledger.apply(signal.action, price, observation.timestamp);
        if let Some(point) = self.ledger.mark(price, observation.timestamp) {
            telemetry::set_gauge(GaugeMetric::Equity, point.equity);
            telemetry::set_gauge(GaugeMetric::Drawdown, point.drawdown);
        }
        telemetry::set_gauge(GaugeMetric::Balance, self.ledger.balance());

        match transition {
            None => Ok(TickOutcome::Signal {
                price,
                action: signal.action,
            }),
            Some(Transition::Opened {
                price,
                units,
                timestamp,
            }) => {
                let order = self.place(OrderSide::Buy, units, price, timestamp).await?;
                telemetry::set_gauge(GaugeMetric::PositionOpen, Decimal::ONE);
                Ok(TickOutcome::Opened(order))
            }
            Some(Transition::Closed(trade)) => {
                let order = self
                    .place(OrderSide::Sell, trade.units, trade.exit_price, trade.exit_time)
                    .await?;
                telemetry::set_gauge(GaugeMetric::PositionOpen, Decimal::ZERO);
                tracing::info!(
                    profit = %trade.profit.round_dp(2),
                    return_pct = %trade.return_pct.round_dp(2),
                    "Position closed"
                );
                Ok(TickOutcome::Closed { order, trade })
            }
        }
    }

    async fn place(
        &self,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        let order = Order::filled(&self.settings.symbol, side, amount, price, timestamp);
        self.store.save(&order).await?;
        telemetry::record_order(side.as_str());
        tracing::info!(
            order_id = %order.id,
            side = side.as_str(),
            %amount,
            %price,
            "Order placed"
        );
        Ok(order)
    }

    /// Poll until Ctrl-C, source exhaustion or `max_ticks` polls
    ///
    /// The store is flushed before returning. An open position is left open.
    pub async fn run(&mut self, max_ticks: Option<u64>) -> anyhow::Result<()> {
        self.run_until(max_ticks, tokio::signal::ctrl_c()).await
    }

    /// Like [`run`](Self::run), stopping when `shutdown` completes
    ///
    /// Shutdown interrupts a fetch that is waiting out its retries. Once a
    /// quote has arrived it is processed to the end.
    pub async fn run_until<F: Future>(
        &mut self,
        max_ticks: Option<u64>,
        shutdown: F,
    ) -> anyhow::Result<()> {
        let period = self.settings.polling_interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        tokio::pin!(shutdown);

        tracing::info!(
            symbol = %self.settings.symbol,
            strategy = self.strategy.name(),
            interval_ms = period.as_millis() as u64,
            "Starting live trading loop"
        );

        loop {
            if max_ticks.is_some_and(|max| self.ticks >= max) {
                tracing::info!(ticks = self.ticks, "Tick limit reached");
                break;
            }

            let fetched = tokio::select! {
                fetched = async {
                    interval.tick().await;
                    self.fetch_with_retry().await
                } => fetched,
                _ = &mut shutdown => {
                    tracing::info!("Received shutdown signal");
                    break;
                }
            };

            match self.handle(fetched).await {
                Ok(TickOutcome::Exhausted) => {
                    tracing::info!("Price source exhausted");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to save order");
                }
            }
        }

        self.store.flush().await?;

        let stats = self.ledger.result();
        tracing::info!(
            ticks = self.ticks,
            trades = stats.total_trades,
            balance = %self.ledger.balance().round_dp(2),
            "Live trading stopped"
        );
        Ok(())
    }
}
