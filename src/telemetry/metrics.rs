//! Prometheus metrics

use crate::strategy::Action;
use ::metrics::{counter, gauge};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Mark-to-market equity
    Equity,
    /// Current drawdown fraction
    Drawdown,
    /// Cash balance
    Balance,
    /// 1 while holding a position, 0 when flat
    PositionOpen,
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::Equity => "smatrader_equity",
            GaugeMetric::Drawdown => "smatrader_drawdown_ratio",
            GaugeMetric::Balance => "smatrader_balance",
            GaugeMetric::PositionOpen => "smatrader_position_open",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: Decimal) {
    let value = value.to_f64().unwrap_or(0.0);
    gauge!(metric.name()).set(value);
}

/// Count a strategy signal
pub fn record_signal(action: Action) {
    counter!("smatrader_signals_total", "action" => action.as_str()).increment(1);
}

/// Count an order placed by the live loop
pub fn record_order(side: &'static str) {
    counter!("smatrader_orders_total", "side" => side).increment(1);
}

/// Count a quote dropped because its price did not parse
pub fn record_skipped_observation() {
    counter!("smatrader_skipped_observations_total").increment(1);
}

/// Count a failed market-data fetch
pub fn record_fetch_failure() {
    counter!("smatrader_fetch_failures_total").increment(1);
}
