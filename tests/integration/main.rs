//! Integration tests

mod backtest_test;
mod e2e_test;
mod feed_test;
mod strategy_test;
