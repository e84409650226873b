// src/application/dto.rs
// Application-layer errors and view DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::domain::errors::{AppError, StoreError};
use crate::domain::models::{LineItem, Order, OrderStatus};

#[derive(Error, Debug)]
pub enum ApplicationError {
    /// A targeted order is not in the precondition state. The whole
    /// multi-order operation failed atomically; re-fetch and retry
    /// against current state.
    #[error("State conflict: orders {stale_ids:?} are no longer {expected}")]
    StateConflict {
        expected: OrderStatus,
        stale_ids: Vec<String>,
    },

    #[error("Order store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("No pending orders for batch {0}")]
    EmptyBatch(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

// Convert between store/domain and application errors
impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict {
                expected,
                stale_ids,
            } => ApplicationError::StateConflict {
                expected,
                stale_ids,
            },
            StoreError::Duplicate(id) => {
                ApplicationError::Validation(format!("duplicate order id {}", id))
            }
            StoreError::Unavailable(reason) => ApplicationError::StoreUnavailable(reason),
        }
    }
}

impl From<ApplicationError> for AppError {
    fn from(error: ApplicationError) -> Self {
        AppError::Application(error.to_string())
    }
}

/// Draft order from checkout, before an id or timestamp is assigned.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub store_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_date: NaiveDate,
    pub items: Vec<LineItem>,
}

/// One row of the operator-facing grouped view. The `order_ids` list is
/// what an operator-initiated release passes back, so the transition
/// commits against the exact set that was shown.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub delivery_date: NaiveDate,
    pub store_id: String,
    pub order_count: usize,
    pub total_value: Decimal,
    pub eligible: bool,
    pub remaining: Decimal,
    pub order_ids: Vec<String>,
}

/// One card in the driver's run sheet.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryStop {
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub store_id: String,
    pub total: Decimal,
}

impl From<&Order> for DeliveryStop {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            delivery_address: order.delivery_address.clone(),
            store_id: order.store_id.clone(),
            total: order.total,
        }
    }
}

/// Customer-facing progress for one order: while pending, how close its
/// batch is to the release threshold.
#[derive(Debug, Clone)]
pub struct OrderProgress {
    pub order: Order,
    pub batch_total: Option<Decimal>,
    pub remaining: Option<Decimal>,
}

/// Result of a successful batch release. Notification counts are
/// informational only; the status commit already succeeded.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub orders: Vec<Order>,
    pub notified: usize,
    pub failed: usize,
}
