//! Strategy behaviour through the public API

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sma_trader::feed::PriceObservation;
use sma_trader::strategy::{Action, CrossoverConfig, MovingAverageCrossover, Strategy};

fn crossover() -> MovingAverageCrossover {
    MovingAverageCrossover::new(CrossoverConfig {
        short_period: 5,
        long_period: 10,
        threshold: dec!(0.01),
    })
    .unwrap()
}

fn observations(prices: &[&str]) -> Vec<PriceObservation> {
    let base = Utc::now();
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| PriceObservation::new("005930", *p, base + Duration::minutes(i as i64)))
        .collect()
}

/// Run every observation through `analyze`, treating parse failures as Hold
fn analyze_all(strategy: &mut impl Strategy, series: &[PriceObservation]) -> Vec<Action> {
    series
        .iter()
        .map(|obs| strategy.analyze(obs).map_or(Action::Hold, |s| s.action))
        .collect()
}

#[test]
fn test_short_series_only_holds() {
    let series = observations(&["100", "120", "140", "160", "180", "200", "220", "240", "260"]);
    let actions = analyze_all(&mut crossover(), &series);
    assert!(actions.iter().all(|a| *a == Action::Hold));
}

#[test]
fn test_increasing_series_ends_with_buy() {
    let prices: Vec<String> = (100..=110).map(|p| p.to_string()).collect();
    let prices: Vec<&str> = prices.iter().map(String::as_str).collect();
    let actions = analyze_all(&mut crossover(), &observations(&prices));

    assert!(actions[..9].iter().all(|a| *a == Action::Hold));
    assert_eq!(actions.last(), Some(&Action::Buy));
}

#[test]
fn test_decreasing_series_ends_with_sell() {
    let prices: Vec<String> = (100..=110).rev().map(|p| p.to_string()).collect();
    let prices: Vec<&str> = prices.iter().map(String::as_str).collect();
    let actions = analyze_all(&mut crossover(), &observations(&prices));
    assert_eq!(actions.last(), Some(&Action::Sell));
}

#[test]
fn test_oscillation_inside_band_holds() {
    let prices: Vec<&str> = (0..30).map(|i| if i % 2 == 0 { "100" } else { "101" }).collect();
    let actions = analyze_all(&mut crossover(), &observations(&prices));
    assert!(actions.iter().all(|a| *a == Action::Hold));
}

#[test]
fn test_unparsable_quote_does_not_change_outcome() {
    let clean: Vec<String> = (100..=110).map(|p| p.to_string()).collect();
    let clean: Vec<&str> = clean.iter().map(String::as_str).collect();

    let mut noisy = clean.clone();
    noisy.insert(6, "not-a-price");

    let mut a = crossover();
    let mut b = crossover();
    let clean_actions = analyze_all(&mut a, &observations(&clean));
    let noisy_actions = analyze_all(&mut b, &observations(&noisy));

    assert_eq!(clean_actions.last(), noisy_actions.last());
    assert_eq!(a.short_sma(), b.short_sma());
    assert_eq!(a.long_sma(), b.long_sma());
}

#[test]
fn test_boxed_strategy_dispatches() {
    let mut strategy: Box<dyn Strategy> = Box::new(crossover());
    assert_eq!(strategy.name(), "sma_crossover");
    assert_eq!(strategy.on_price(dec!(100)).action, Action::Hold);
}
