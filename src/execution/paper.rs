//! In-memory order store for paper trading

use super::{Order, OrderStore, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps saved orders in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every saved order
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn save(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.push(order.clone());

        tracing::info!(
            order_id = %order.id,
            side = order.side.as_str(),
            amount = %order.amount,
            price = %order.price,
            "Paper order saved"
        );
        Ok(())
    }
}
