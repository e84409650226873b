// src/infrastructure/store/mod.rs
// In-memory order store implementation
//
// Reference implementation of the `OrderRepository` seam. Atomicity of
// `update_status` comes from holding the write lock across the whole
// check-then-write; a relational implementation would use a transaction
// with the same compare-and-set shape.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{broadcast, RwLock};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{Order, OrderStatus};
use crate::domain::repository::{OrderRepository, StoreEvent};

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
    events: broadcast::Sender<StoreEvent>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            orders: RwLock::new(HashMap::new()),
            events,
        }
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine; the feed is passive.
        let _ = self.events.send(event);
    }

    fn sorted_by_creation(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        orders
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate(order.id));
        }
        let id = order.id.clone();
        orders.insert(id.clone(), order);
        drop(orders);

        self.emit(StoreEvent::OrderCreated { id });
        Ok(())
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn fetch_pending(&self) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let pending = orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .cloned()
            .collect();
        Ok(Self::sorted_by_creation(pending))
    }

    async fn fetch_ready_for(&self, date: NaiveDate) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let ready = orders
            .values()
            .filter(|o| o.status == OrderStatus::Ready && o.delivery_date == date)
            .cloned()
            .collect();
        Ok(Self::sorted_by_creation(ready))
    }

    async fn delivered_count(&self) -> StoreResult<usize> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|o| o.status == OrderStatus::Delivered)
            .count())
    }

    async fn update_status(
        &self,
        ids: &[String],
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<Vec<Order>> {
        debug_assert!(
            from.can_transition_to(to),
            "illegal transition {} -> {}",
            from,
            to
        );

        let mut orders = self.orders.write().await;

        // Check every row first; unknown ids count as stale too.
        let stale_ids: Vec<String> = ids
            .iter()
            .filter(|id| orders.get(*id).map(|o| o.status) != Some(from))
            .cloned()
            .collect();
        if !stale_ids.is_empty() {
            return Err(StoreError::Conflict {
                expected: from,
                stale_ids,
            });
        }

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            // Presence was just verified under the same write lock.
            if let Some(order) = orders.get_mut(id) {
                order.status = to;
                updated.push(order.clone());
            }
        }
        drop(orders);

        self.emit(StoreEvent::StatusChanged {
            ids: ids.to_vec(),
            status: to,
        });
        Ok(updated)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            store_id: "store-A".into(),
            customer_name: "Asha".into(),
            customer_email: "asha@example.com".into(),
            customer_phone: "0400 000 000".into(),
            delivery_address: "123 Main St".into(),
            delivery_date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
            items: Vec::new(),
            total: dec!(40.00),
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn update_status_is_all_or_nothing() {
        let store = InMemoryOrderStore::new();
        store.insert(order("o1", OrderStatus::Pending)).await.unwrap();
        store.insert(order("o2", OrderStatus::Ready)).await.unwrap();

        let ids = vec!["o1".to_string(), "o2".to_string()];
        let err = store
            .update_status(&ids, OrderStatus::Pending, OrderStatus::Ready)
            .await
            .unwrap_err();

        match err {
            StoreError::Conflict { stale_ids, .. } => {
                assert_eq!(stale_ids, vec!["o2".to_string()])
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        // o1 untouched by the failed batch update
        let o1 = store.find("o1").await.unwrap().unwrap();
        assert_eq!(o1.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_ids_are_reported_as_stale() {
        let store = InMemoryOrderStore::new();
        store.insert(order("o1", OrderStatus::Pending)).await.unwrap();

        let ids = vec!["o1".to_string(), "ghost".to_string()];
        let err = store
            .update_status(&ids, OrderStatus::Pending, OrderStatus::Ready)
            .await
            .unwrap_err();

        match err {
            StoreError::Conflict { stale_ids, .. } => {
                assert_eq!(stale_ids, vec!["ghost".to_string()])
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryOrderStore::new();
        store.insert(order("o1", OrderStatus::Pending)).await.unwrap();
        let err = store.insert(order("o1", OrderStatus::Pending)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "o1"));
    }

    #[tokio::test]
    async fn change_feed_signals_writes() {
        let store = InMemoryOrderStore::new();
        let mut rx = store.subscribe();

        store.insert(order("o1", OrderStatus::Pending)).await.unwrap();
        let ids = vec!["o1".to_string()];
        store
            .update_status(&ids, OrderStatus::Pending, OrderStatus::Ready)
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            StoreEvent::OrderCreated { id } => assert_eq!(id, "o1"),
            other => panic!("expected creation event, got {:?}", other),
        }
        match rx.recv().await.unwrap() {
            StoreEvent::StatusChanged { ids, status } => {
                assert_eq!(ids, vec!["o1".to_string()]);
                assert_eq!(status, OrderStatus::Ready);
            }
            other => panic!("expected status event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn driver_read_filters_by_status_and_date() {
        let store = InMemoryOrderStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let other_date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();

        let mut ready_today = order("o1", OrderStatus::Ready);
        ready_today.delivery_date = date;
        let mut ready_later = order("o2", OrderStatus::Ready);
        ready_later.delivery_date = other_date;
        let mut pending_today = order("o3", OrderStatus::Pending);
        pending_today.delivery_date = date;

        store.insert(ready_today).await.unwrap();
        store.insert(ready_later).await.unwrap();
        store.insert(pending_today).await.unwrap();

        let run_sheet = store.fetch_ready_for(date).await.unwrap();
        let ids: Vec<&str> = run_sheet.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1"]);
    }
}
