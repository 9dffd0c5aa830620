//! sma-trader: Moving-average crossover trading client for a single instrument
//!
//! This library provides the core components for:
//! - Price observations and pluggable price sources (HTTP quotes, Parquet, replay)
//! - A short/long simple moving average crossover strategy
//! - A single-position backtest engine with commission and drawdown tracking
//! - A polling live loop that paper-fills and stores orders
//! - Data capture to Parquet
//! - Logging and Prometheus metrics

pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod execution;
pub mod feed;
pub mod live;
pub mod strategy;
pub mod telemetry;
