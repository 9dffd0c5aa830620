//! End-to-end integration tests

use chrono::{Duration, Utc};
use sma_trader::backtest::Backtester;
use sma_trader::config::Config;
use sma_trader::data::ParquetWriter;
use sma_trader::execution::{MemoryOrderStore, OrderSide};
use sma_trader::feed::{
    HistoryRange, ParquetPriceSource, PriceObservation, PriceSource, ReplaySource,
};
use sma_trader::live::{LiveSettings, LiveTrader};
use sma_trader::strategy::MovingAverageCrossover;
use tempfile::TempDir;

fn zigzag() -> Vec<PriceObservation> {
    let base = Utc::now();
    let up = (0..15).map(|i| 100 + 2 * i);
    let down = (0..15).map(|i| 130 - 2 * i);
    up.chain(down)
        .chain((0..15).map(|i| 100 + 2 * i))
        .enumerate()
        .map(|(i, p)| {
            PriceObservation::new("005930", p.to_string(), base + Duration::minutes(i as i64))
        })
        .collect()
}

#[test]
fn test_config_example_loads() {
    let config = Config::from_toml(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.feed.symbol, "005930");
    assert_eq!(config.strategy.short_period, 5);
    assert_eq!(config.strategy.long_period, 10);
    assert_eq!(config.live.max_retries, 3);
    assert_eq!(config.feed.price_pointer, "/output/stck_prpr");
}

#[tokio::test]
async fn test_recorded_history_backtests_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ParquetWriter::new(temp_dir.path());
    let series = zigzag();
    writer
        .write_observations(&writer.file_path("prices", series[0].timestamp), &series)
        .unwrap();

    let config = Config::default();
    let history = ParquetPriceSource::new(temp_dir.path())
        .fetch_history(&config.feed.symbol, HistoryRange::all())
        .await
        .unwrap();
    assert_eq!(history.len(), series.len());

    let strategy = MovingAverageCrossover::new(config.strategy.clone()).unwrap();
    let result = Backtester::new(strategy, history, config.backtest.clone())
        .unwrap()
        .run();

    assert!(result.total_trades >= 2);
    assert_eq!(result.winning_trades + result.losing_trades, result.total_trades);

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["total_trades"], result.total_trades);
    assert!(json["trades"].is_array());
    assert!(result.format_table().contains("BACKTEST RESULTS"));
}

#[tokio::test]
async fn test_live_replay_matches_backtest_entries() {
    let series = zigzag();
    let config = Config::default();

    let strategy = MovingAverageCrossover::new(config.strategy.clone()).unwrap();
    let backtest = Backtester::new(strategy, series.clone(), config.backtest.clone())
        .unwrap()
        .run();

    let store = MemoryOrderStore::new();
    let settings = LiveSettings {
        symbol: "005930".to_string(),
        polling_interval: std::time::Duration::from_millis(1),
        max_retries: 0,
        retry_delay: std::time::Duration::from_millis(1),
    };
    let mut trader = LiveTrader::new(
        ReplaySource::new(series),
        MovingAverageCrossover::new(config.strategy.clone()).unwrap(),
        store.clone(),
        settings,
        config.backtest.clone(),
    );
    trader.run(None).await.unwrap();

    let orders = store.orders().await;
    let buys: Vec<_> = orders.iter().filter(|o| o.side == OrderSide::Buy).collect();
    assert_eq!(buys.len(), backtest.total_trades);
    for (buy, trade) in buys.iter().zip(&backtest.trades) {
        assert_eq!(buy.price, trade.entry_price);
        assert_eq!(buy.amount, trade.units);
    }
}
