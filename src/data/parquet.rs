//! Parquet storage for observations, trades, equity curves and orders

use crate::backtest::{EquityPoint, TradeRecord};
use crate::execution::Order;
use crate::feed::PriceObservation;
use arrow::array::{Array, ArrayRef, BooleanArray, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn timestamp_field(name: &str) -> Field {
    Field::new(
        name,
        DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        false,
    )
}

fn timestamps(values: Vec<i64>) -> ArrayRef {
    Arc::new(TimestampMicrosecondArray::from(values).with_timezone("UTC"))
}

fn decimals(values: impl Iterator<Item = Decimal>) -> ArrayRef {
    let text: Vec<String> = values.map(|d| d.to_string()).collect();
    Arc::new(StringArray::from(text))
}

/// Price observation schema
///
/// Prices are stored as the quoted text so malformed quotes are preserved.
pub fn observation_schema() -> Schema {
    Schema::new(vec![
        timestamp_field("timestamp"),
        Field::new("symbol", DataType::Utf8, false),
        Field::new("price", DataType::Utf8, false),
    ])
}

/// Closed trade schema
pub fn trade_schema() -> Schema {
    Schema::new(vec![
        timestamp_field("entry_time"),
        timestamp_field("exit_time"),
        Field::new("entry_price", DataType::Utf8, false),
        Field::new("exit_price", DataType::Utf8, false),
        Field::new("units", DataType::Utf8, false),
        Field::new("balance", DataType::Utf8, false),
        Field::new("profit", DataType::Utf8, false),
        Field::new("return_pct", DataType::Utf8, false),
        Field::new("forced", DataType::Boolean, false),
    ])
}

/// Equity curve schema
pub fn equity_schema() -> Schema {
    Schema::new(vec![
        timestamp_field("timestamp"),
        Field::new("equity", DataType::Utf8, false),
        Field::new("drawdown", DataType::Utf8, false),
    ])
}

/// Order schema
pub fn order_schema() -> Schema {
    Schema::new(vec![
        timestamp_field("timestamp"),
        Field::new("id", DataType::Utf8, false),
        Field::new("symbol", DataType::Utf8, false),
        Field::new("side", DataType::Utf8, false),
        Field::new("amount", DataType::Utf8, false),
        Field::new("price", DataType::Utf8, false),
        Field::new("status", DataType::Utf8, false),
    ])
}

/// Writes record batches to Parquet files under one directory
#[derive(Debug, Clone)]
pub struct ParquetWriter {
    output_dir: PathBuf,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Generate file path for a given timestamp and prefix
    pub fn file_path(&self, prefix: &str, timestamp: DateTime<Utc>) -> PathBuf {
        let filename = format!("{}_{}.parquet", prefix, timestamp.format("%Y%m%d_%H%M%S"));
        self.output_dir.join(filename)
    }

    fn write_batch(&self, path: &Path, schema: SchemaRef, columns: Vec<ArrayRef>) -> anyhow::Result<()> {
        self.ensure_dir()?;

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        let batch = RecordBatch::try_new(schema, columns)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    /// Write price observations to a Parquet file
    pub fn write_observations(
        &self,
        path: &Path,
        observations: &[PriceObservation],
    ) -> anyhow::Result<()> {
        if observations.is_empty() {
            return Ok(());
        }

        let columns = vec![
            timestamps(
                observations
                    .iter()
                    .map(|o| o.timestamp.timestamp_micros())
                    .collect(),
            ),
            Arc::new(StringArray::from(
                observations.iter().map(|o| o.symbol.as_str()).collect::<Vec<_>>(),
            )) as ArrayRef,
            Arc::new(StringArray::from(
                observations.iter().map(|o| o.price.as_str()).collect::<Vec<_>>(),
            )) as ArrayRef,
        ];

        self.write_batch(path, Arc::new(observation_schema()), columns)?;
        tracing::debug!(path = ?path, count = observations.len(), "Wrote observations to Parquet");
        Ok(())
    }

    /// Write closed trades to a Parquet file
    pub fn write_trades(&self, path: &Path, trades: &[TradeRecord]) -> anyhow::Result<()> {
        if trades.is_empty() {
            return Ok(());
        }

        let columns = vec![
            timestamps(trades.iter().map(|t| t.entry_time.timestamp_micros()).collect()),
            timestamps(trades.iter().map(|t| t.exit_time.timestamp_micros()).collect()),
            decimals(trades.iter().map(|t| t.entry_price)),
            decimals(trades.iter().map(|t| t.exit_price)),
            decimals(trades.iter().map(|t| t.units)),
            decimals(trades.iter().map(|t| t.balance)),
            decimals(trades.iter().map(|t| t.profit)),
            decimals(trades.iter().map(|t| t.return_pct)),
            Arc::new(BooleanArray::from(
                trades.iter().map(|t| t.forced).collect::<Vec<_>>(),
            )) as ArrayRef,
        ];

        self.write_batch(path, Arc::new(trade_schema()), columns)?;
        tracing::debug!(path = ?path, count = trades.len(), "Wrote trades to Parquet");
        Ok(())
    }

    /// Write an equity curve to a Parquet file
    pub fn write_equity_curve(&self, path: &Path, points: &[EquityPoint]) -> anyhow::Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let columns = vec![
            timestamps(points.iter().map(|p| p.timestamp.timestamp_micros()).collect()),
            decimals(points.iter().map(|p| p.equity)),
            decimals(points.iter().map(|p| p.drawdown)),
        ];

        self.write_batch(path, Arc::new(equity_schema()), columns)?;
        tracing::debug!(path = ?path, count = points.len(), "Wrote equity curve to Parquet");
        Ok(())
    }

    /// Write orders to a Parquet file
    pub fn write_orders(&self, path: &Path, orders: &[Order]) -> anyhow::Result<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = orders.iter().map(|o| o.id.to_string()).collect();
        let columns = vec![
            timestamps(orders.iter().map(|o| o.timestamp.timestamp_micros()).collect()),
            Arc::new(StringArray::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(
                orders.iter().map(|o| o.symbol.as_str()).collect::<Vec<_>>(),
            )) as ArrayRef,
            Arc::new(StringArray::from(
                orders.iter().map(|o| o.side.as_str()).collect::<Vec<_>>(),
            )) as ArrayRef,
            decimals(orders.iter().map(|o| o.amount)),
            decimals(orders.iter().map(|o| o.price)),
            Arc::new(StringArray::from(
                orders.iter().map(|o| o.status.as_str()).collect::<Vec<_>>(),
            )) as ArrayRef,
        ];

        self.write_batch(path, Arc::new(order_schema()), columns)?;
        tracing::debug!(path = ?path, count = orders.len(), "Wrote orders to Parquet");
        Ok(())
    }
}

/// Reader for Parquet files
pub struct ParquetReader {
    path: PathBuf,
}

impl ParquetReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read price observations from a Parquet file, in file order
    pub fn read_observations(&self) -> anyhow::Result<Vec<PriceObservation>> {
        let file = File::open(&self.path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut observations = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;

            let ts = column::<TimestampMicrosecondArray>(&batch, "timestamp")?;
            let symbols = column::<StringArray>(&batch, "symbol")?;
            let prices = column::<StringArray>(&batch, "price")?;

            for i in 0..batch.num_rows() {
                let timestamp = DateTime::from_timestamp_micros(ts.value(i))
                    .ok_or_else(|| anyhow::anyhow!("Invalid timestamp at row {}", i))?;
                // null prices are kept as empty text and rejected at parse time
                let price = if prices.is_null(i) {
                    String::new()
                } else {
                    prices.value(i).to_string()
                };

                observations.push(PriceObservation {
                    symbol: symbols.value(i).to_string(),
                    price,
                    timestamp,
                });
            }
        }

        Ok(observations)
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow::anyhow!("Missing {} column", name))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow::anyhow!("Invalid {} column", name))
}
