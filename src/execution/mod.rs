//! Execution module
//!
//! Orders produced by the live loop and the stores that persist them

mod paper;
mod store;
mod types;

pub use paper::MemoryOrderStore;
pub use store::ParquetOrderStore;
pub use types::{Order, OrderId, OrderSide, OrderStatus};

use async_trait::async_trait;
use thiserror::Error;

/// Order persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write orders: {0}")]
    Write(String),
}

/// Trait for order persistence
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist one order
    async fn save(&self, order: &Order) -> Result<(), StoreError>;

    /// Write out anything buffered
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
