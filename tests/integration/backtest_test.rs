//! Backtest scenarios end to end

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sma_trader::backtest::{BacktestResult, BacktestSettings, Backtester};
use sma_trader::feed::PriceObservation;
use sma_trader::strategy::{Action, CrossoverConfig, MovingAverageCrossover, Signal, Strategy};

fn base_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-04T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn series(prices: &[String]) -> Vec<PriceObservation> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            PriceObservation::new("005930", p.as_str(), base_time() + Duration::minutes(i as i64))
        })
        .collect()
}

/// Triangle wave between 100 and 130
fn wave(cycles: usize) -> Vec<String> {
    let up = (0..15).map(|i| 100 + 2 * i);
    let down = (0..15).map(|i| 130 - 2 * i);
    let cycle: Vec<i64> = up.chain(down).collect();
    cycle
        .iter()
        .cycle()
        .take(cycle.len() * cycles)
        .map(|p| p.to_string())
        .collect()
}

fn crossover() -> MovingAverageCrossover {
    MovingAverageCrossover::new(CrossoverConfig::default()).unwrap()
}

fn run(prices: &[String], settings: BacktestSettings) -> BacktestResult {
    Backtester::new(crossover(), series(prices), settings)
        .unwrap()
        .run()
}

/// Buys on the first price and sells on the second
struct BuyThenSell {
    calls: usize,
}

impl Strategy for BuyThenSell {
    fn name(&self) -> &str {
        "buy_then_sell"
    }

    fn on_price(&mut self, _price: Decimal) -> Signal {
        self.calls += 1;
        match self.calls {
            1 => Signal::buy(Decimal::ONE),
            2 => Signal::sell(Decimal::ONE),
            _ => Signal::hold(),
        }
    }
}

#[test]
fn test_commission_compounds_per_round_trip() {
    let settings = BacktestSettings {
        initial_balance: dec!(10000000),
        commission_rate: dec!(0.0025),
    };
    let prices = ["100".to_string(), "110".to_string()];
    let result = Backtester::new(BuyThenSell { calls: 0 }, series(&prices), settings)
        .unwrap()
        .run();

    let frictionless = dec!(10000000) * dec!(110) / dec!(100);
    let factor = (Decimal::ONE - dec!(0.0025)) * (Decimal::ONE - dec!(0.0025));
    assert_eq!(result.final_balance, frictionless * factor);
    assert_eq!(result.final_balance, dec!(10945068.75));
    assert_eq!(result.total_trades, 1);
    assert_eq!(result.winning_trades, 1);
}

#[test]
fn test_trade_counts_are_consistent() {
    let result = run(&wave(4), BacktestSettings::default());

    assert!(result.total_trades > 0);
    assert_eq!(result.winning_trades + result.losing_trades, result.total_trades);
    assert_eq!(result.trades.len(), result.total_trades);
    assert!(result.win_rate >= Decimal::ZERO && result.win_rate <= Decimal::ONE);
    assert!(result.max_drawdown >= Decimal::ZERO && result.max_drawdown <= Decimal::ONE);
}

#[test]
fn test_same_series_same_result() {
    let prices = wave(3);
    let a = run(&prices, BacktestSettings::default());
    let b = run(&prices, BacktestSettings::default());
    assert_eq!(a, b);
}

#[test]
fn test_no_trades_leaves_statistics_zero() {
    let prices: Vec<String> = (0..20)
        .map(|i| if i % 2 == 0 { "100" } else { "101" }.to_string())
        .collect();
    let result = run(&prices, BacktestSettings::default());

    assert_eq!(result.total_trades, 0);
    assert_eq!(result.win_rate, Decimal::ZERO);
    assert_eq!(result.average_profit_per_trade, Decimal::ZERO);
    assert_eq!(result.final_balance, result.initial_balance);
    assert_eq!(result.start_date, Some(base_time()));
    assert_eq!(result.end_date, Some(base_time() + Duration::minutes(19)));
}

#[test]
fn test_open_position_is_force_closed() {
    let prices: Vec<String> = (100..=115).map(|p| p.to_string()).collect();
    let result = run(&prices, BacktestSettings::default());

    assert_eq!(result.total_trades, 1);
    let trade = &result.trades[0];
    assert!(trade.forced);
    assert_eq!(trade.exit_price, dec!(115));
    assert_eq!(result.final_balance, trade.balance);
}

#[test]
fn test_unparsable_prices_are_counted_and_skipped() {
    let mut prices: Vec<String> = (100..=110).map(|p| p.to_string()).collect();
    prices.insert(3, "n/a".to_string());
    prices.push(String::new());

    let result = run(&prices, BacktestSettings::default());
    assert_eq!(result.skipped_observations, 2);
    assert_eq!(result.equity_curve.len(), 11);
    assert_eq!(result.total_trades, 1);
}

#[test]
fn test_invalid_settings_fail_construction() {
    let settings = BacktestSettings {
        initial_balance: Decimal::ZERO,
        commission_rate: dec!(0.001),
    };
    assert!(Backtester::new(crossover(), Vec::new(), settings).is_err());

    let settings = BacktestSettings {
        initial_balance: dec!(1000),
        commission_rate: dec!(-0.1),
    };
    assert!(Backtester::new(crossover(), Vec::new(), settings).is_err());
}

#[test]
fn test_buy_ignored_while_long() {
    let actions = [Action::Buy, Action::Buy];
    let prices: Vec<String> = ["100", "50"].iter().map(|p| p.to_string()).collect();

    struct Fixed(Vec<Action>);
    impl Strategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn on_price(&mut self, _price: Decimal) -> Signal {
            match self.0.pop() {
                Some(Action::Buy) => Signal::buy(Decimal::ONE),
                Some(Action::Sell) => Signal::sell(Decimal::ONE),
                _ => Signal::hold(),
            }
        }
    }

    let strategy = Fixed(actions.to_vec());
    let result = Backtester::new(strategy, series(&prices), BacktestSettings::default())
        .unwrap()
        .run();
    assert_eq!(result.total_trades, 1);
    assert_eq!(result.trades[0].entry_price, dec!(100));
}
