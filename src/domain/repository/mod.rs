// src/domain/repository/mod.rs
// Repository interface for the order store

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::domain::errors::StoreResult;
use crate::domain::models::{Order, OrderStatus};

/// Change-feed signal. Delivery is at-least-once and may coalesce;
/// consumers re-read fully rather than applying deltas.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    OrderCreated { id: String },
    StatusChanged { ids: Vec<String>, status: OrderStatus },
}

/// Seam over the durable order store. Any relational store with atomic
/// multi-row updates and a change feed can implement this; the in-memory
/// implementation in `infrastructure::store` is the reference one.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: Order) -> StoreResult<()>;

    async fn find(&self, id: &str) -> StoreResult<Option<Order>>;

    /// All pending orders, ascending by creation time.
    async fn fetch_pending(&self) -> StoreResult<Vec<Order>>;

    /// Driver-facing read: ready orders for one delivery date, ascending
    /// by creation time.
    async fn fetch_ready_for(&self, date: NaiveDate) -> StoreResult<Vec<Order>>;

    async fn delivered_count(&self) -> StoreResult<usize>;

    /// Compare-and-set across the explicit id list: every order must be
    /// in `from` or the whole call fails with `StoreError::Conflict` and
    /// no row changes. Returns the updated orders on success.
    async fn update_status(
        &self,
        ids: &[String],
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Vec<Order>>;

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
