// src/application/usecase/aggregation.rs
// Batch aggregation: read-only projection of pending orders into batches

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::dto::ApplicationError;
use crate::domain::models::{Batch, BatchKey, Order, OrderStatus};
use crate::domain::repository::OrderRepository;

/// Partition pending orders by exact `(delivery_date, store_id)` key.
/// Members are ordered by creation time ascending; totals are exact
/// decimal sums, so the projection is idempotent and order-independent.
/// Non-pending orders are ignored: a batch dissolves for an order the
/// moment it leaves `Pending`.
pub fn group_pending(orders: impl IntoIterator<Item = Order>) -> BTreeMap<BatchKey, Batch> {
    let mut groups: BTreeMap<BatchKey, Vec<Order>> = BTreeMap::new();
    for order in orders {
        if order.status != OrderStatus::Pending {
            continue;
        }
        groups.entry(order.batch_key()).or_default().push(order);
    }

    groups
        .into_iter()
        .map(|(key, mut members)| {
            members.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });
            let total_value = members.iter().map(|o| o.total).sum();
            let batch = Batch {
                key: key.clone(),
                order_count: members.len(),
                total_value,
                orders: members,
            };
            (key, batch)
        })
        .collect()
}

#[async_trait]
pub trait BatchAggregationUseCase {
    /// Current batches, recomputed fresh from the order store. No caching:
    /// the store is the only source of truth.
    async fn pending_batches(&self) -> Result<BTreeMap<BatchKey, Batch>, ApplicationError>;
}

pub struct BatchAggregator {
    repository: Arc<dyn OrderRepository>,
}

impl BatchAggregator {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl BatchAggregationUseCase for BatchAggregator {
    async fn pending_batches(&self) -> Result<BTreeMap<BatchKey, Batch>, ApplicationError> {
        let pending = self.repository.fetch_pending().await?;
        Ok(group_pending(pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn order(
        id: &str,
        date: NaiveDate,
        store_id: &str,
        total: Decimal,
        status: OrderStatus,
        created_offset_secs: i64,
    ) -> Order {
        Order {
            id: id.to_string(),
            store_id: store_id.to_string(),
            customer_name: format!("Customer {}", id),
            customer_email: format!("{}@example.com", id),
            customer_phone: "0400 000 000".into(),
            delivery_address: "123 Main St".into(),
            delivery_date: date,
            items: Vec::new(),
            total,
            status,
            created_at: Utc.with_ymd_and_hms(2025, 12, 20, 9, 0, 0).unwrap()
                + chrono::Duration::seconds(created_offset_secs),
        }
    }

    fn dec24() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 24).unwrap()
    }

    #[test]
    fn grouping_is_a_partition_over_pending_orders() {
        let dec25 = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let orders = vec![
            order("o1", dec24(), "store-A", dec!(40.00), OrderStatus::Pending, 0),
            order("o2", dec24(), "store-A", dec!(35.00), OrderStatus::Pending, 1),
            order("o3", dec24(), "store-B", dec!(20.00), OrderStatus::Pending, 2),
            order("o4", dec25, "store-A", dec!(15.00), OrderStatus::Pending, 3),
            order("o5", dec24(), "store-A", dec!(99.00), OrderStatus::Ready, 4),
        ];

        let batches = group_pending(orders);
        assert_eq!(batches.len(), 3);

        let member_count: usize = batches.values().map(|b| b.order_count).sum();
        assert_eq!(member_count, 4, "every pending order lands in exactly one group");

        let key = BatchKey {
            delivery_date: dec24(),
            store_id: "store-A".into(),
        };
        assert_eq!(batches[&key].order_ids(), vec!["o1", "o2"]);
        assert_eq!(batches[&key].total_value, dec!(75.00));
    }

    #[test]
    fn totals_are_exact_and_order_independent() {
        let mut orders = vec![
            order("o1", dec24(), "store-A", dec!(40.00), OrderStatus::Pending, 0),
            order("o2", dec24(), "store-A", dec!(35.00), OrderStatus::Pending, 1),
            order("o3", dec24(), "store-A", dec!(30.00), OrderStatus::Pending, 2),
        ];

        let forward = group_pending(orders.clone());
        orders.reverse();
        let reversed = group_pending(orders);

        let key = BatchKey {
            delivery_date: dec24(),
            store_id: "store-A".into(),
        };
        assert_eq!(forward[&key].total_value, dec!(105.00));
        assert_eq!(reversed[&key].total_value, dec!(105.00));
        // Display order stays by creation time regardless of input order
        assert_eq!(reversed[&key].order_ids(), vec!["o1", "o2", "o3"]);
    }

    #[test]
    fn penny_amounts_do_not_drift() {
        let orders: Vec<Order> = (0..100)
            .map(|i| {
                order(
                    &format!("o{}", i),
                    dec24(),
                    "store-A",
                    dec!(0.10),
                    OrderStatus::Pending,
                    i,
                )
            })
            .collect();

        let batches = group_pending(orders);
        let key = BatchKey {
            delivery_date: dec24(),
            store_id: "store-A".into(),
        };
        assert_eq!(batches[&key].total_value, dec!(10.00));
    }

    #[test]
    fn non_pending_orders_form_no_batch() {
        let orders = vec![
            order("o1", dec24(), "store-A", dec!(40.00), OrderStatus::Ready, 0),
            order("o2", dec24(), "store-A", dec!(35.00), OrderStatus::Delivered, 1),
        ];
        assert!(group_pending(orders).is_empty());
    }
}
