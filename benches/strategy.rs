//! Benchmarks for the crossover strategy and backtest replay

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use sma_trader::backtest::{BacktestSettings, Backtester};
use sma_trader::feed::{HistoryRange, PriceObservation, PriceSource, ReplaySource};
use sma_trader::strategy::{CrossoverConfig, MovingAverageCrossover, Strategy};

fn series(len: usize) -> Vec<PriceObservation> {
    let base = Utc::now();
    (0..len)
        .map(|i| {
            let price = 70_000 + (i % 40) as i64 * 50 - if i % 80 < 40 { 0 } else { 1_000 };
            PriceObservation::new("005930", price.to_string(), base + Duration::seconds(i as i64))
        })
        .collect()
}

fn benchmark_analyze(c: &mut Criterion) {
    let observations = series(1_000);

    c.bench_function("crossover_analyze_1k", |b| {
        b.iter(|| {
            let mut strategy = MovingAverageCrossover::new(CrossoverConfig::default()).unwrap();
            for obs in &observations {
                black_box(strategy.analyze(black_box(obs)).ok());
            }
        })
    });
}

fn benchmark_long_window(c: &mut Criterion) {
    let config = CrossoverConfig {
        short_period: 20,
        long_period: 200,
        threshold: Decimal::new(1, 2),
    };
    let mut strategy = MovingAverageCrossover::new(config).unwrap();
    for i in 0..200 {
        strategy.on_price(Decimal::from(70_000 + i));
    }

    c.bench_function("crossover_on_price_200", |b| {
        b.iter(|| strategy.on_price(black_box(Decimal::from(70_150))))
    });
}

fn benchmark_backtest(c: &mut Criterion) {
    let observations = series(10_000);

    c.bench_function("backtest_10k", |b| {
        b.iter(|| {
            let strategy = MovingAverageCrossover::new(CrossoverConfig::default()).unwrap();
            Backtester::new(strategy, observations.clone(), BacktestSettings::default())
                .unwrap()
                .run()
        })
    });
}

fn benchmark_replay_history(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let source = ReplaySource::new(series(10_000));

    c.bench_function("replay_fetch_history_10k", |b| {
        b.to_async(&runtime)
            .iter(|| source.fetch_history("005930", HistoryRange::all()))
    });
}

criterion_group!(
    benches,
    benchmark_analyze,
    benchmark_long_window,
    benchmark_backtest,
    benchmark_replay_history
);
criterion_main!(benches);
