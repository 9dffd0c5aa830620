//! Data storage module
//!
//! Parquet files for captured quotes, backtest artifacts and orders

mod parquet;

pub use parquet::{
    equity_schema, observation_schema, order_schema, trade_schema, ParquetReader, ParquetWriter,
};
