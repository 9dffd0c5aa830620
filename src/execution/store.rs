//! Parquet-backed order store

use super::{Order, OrderStore, StoreError};
use crate::data::ParquetWriter;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Buffers orders and writes them to a new Parquet file on every flush
pub struct ParquetOrderStore {
    writer: ParquetWriter,
    buffer: Mutex<Vec<Order>>,
}

impl ParquetOrderStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: ParquetWriter::new(output_dir),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Orders waiting for the next flush
    pub async fn pending(&self) -> usize {
        self.buffer.lock().await.len()
    }
}

#[async_trait]
impl OrderStore for ParquetOrderStore {
    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        self.buffer.lock().await.push(order.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let mut buffer = self.buffer.lock().await;
        if buffer.is_empty() {
            return Ok(());
        }

        let path = self.writer.file_path("orders", Utc::now());
        self.writer
            .write_orders(&path, &buffer)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        tracing::info!(path = %path.display(), count = buffer.len(), "Flushed orders");
        buffer.clear();
        Ok(())
    }
}
