// src/domain/models.rs
// Core domain models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One product line captured at checkout. The snapshot is immutable:
/// later catalog price changes never touch an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id")]
    pub product_id: String,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A customer's placed purchase. Created by checkout in `Pending` status,
/// mutated only by the batch release and delivery completion transitions,
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub store_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_date: NaiveDate,
    pub items: Vec<LineItem>,
    /// Sum of line items, fixed at creation. Never recomputed from
    /// current catalog prices.
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn batch_key(&self) -> BatchKey {
        BatchKey {
            delivery_date: self.delivery_date,
            store_id: self.store_id.clone(),
        }
    }

    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

/// Order lifecycle. Status only moves forward, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Forward-only state machine: Pending -> Ready -> Delivered.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Grouping key for pending orders: one delivery day at one store.
/// Equality is exact; there is no date-range merging.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchKey {
    pub delivery_date: NaiveDate,
    pub store_id: String,
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.delivery_date, self.store_id)
    }
}

/// Derived aggregate over the pending orders sharing one `BatchKey`.
/// Never persisted; recomputed fresh from the order store on demand and
/// dissolves the moment its last member leaves `Pending`.
#[derive(Debug, Clone)]
pub struct Batch {
    pub key: BatchKey,
    /// Members in ascending creation order.
    pub orders: Vec<Order>,
    pub order_count: usize,
    pub total_value: Decimal,
}

impl Batch {
    pub fn order_ids(&self) -> Vec<String> {
        self.orders.iter().map(|o| o.id.clone()).collect()
    }
}

/// Result of evaluating a batch against the release threshold.
#[derive(Debug, Clone, Copy)]
pub struct Eligibility {
    pub eligible: bool,
    /// Threshold minus current total, floored at zero.
    pub remaining: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_moves_forward_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Ready));
    }

    #[test]
    fn status_wire_strings_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: OrderStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn order_total_matches_its_snapshot() {
        let items = vec![
            LineItem {
                product_id: "p1".into(),
                name: "Basmati Rice 5kg".into(),
                unit_price: dec!(12.50),
                quantity: 2,
            },
            LineItem {
                product_id: "p2".into(),
                name: "Ghee 1L".into(),
                unit_price: dec!(15.00),
                quantity: 1,
            },
        ];
        let order = Order {
            id: "o1".into(),
            store_id: "store-A".into(),
            customer_name: "Asha".into(),
            customer_email: "asha@example.com".into(),
            customer_phone: "0400 000 000".into(),
            delivery_address: "123 Main St".into(),
            delivery_date: chrono::NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
            total: items.iter().map(LineItem::line_total).sum(),
            items,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        assert_eq!(order.total, dec!(40.00));
        assert_eq!(order.total, order.items_total());
    }

    #[test]
    fn line_item_total_uses_decimal_arithmetic() {
        let item = LineItem {
            product_id: "p1".into(),
            name: "Basmati Rice 5kg".into(),
            unit_price: dec!(12.50),
            quantity: 3,
        };
        assert_eq!(item.line_total(), dec!(37.50));
    }
}
