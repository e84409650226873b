// src/application/usecase/delivery.rs
// Delivery completion transition

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::dto::ApplicationError;
use crate::application::usecase::release::FanOut;
use crate::domain::models::{Order, OrderStatus};
use crate::domain::repository::OrderRepository;
use crate::domain::service::{NotificationService, TemplateKey};

#[async_trait]
pub trait DeliveryCompletionUseCase: Send + Sync {
    /// Driver-initiated: move one order from `Ready` to `Delivered`.
    /// Fails with a state conflict and no change when the order is not
    /// `Ready`. The former batch is not touched; it already dissolved
    /// for this order when it left `Pending`.
    async fn mark_delivered(&self, order_id: &str) -> Result<Order, ApplicationError>;
}

pub struct DeliveryCompleter {
    repository: Arc<dyn OrderRepository>,
    fan_out: FanOut,
}

impl DeliveryCompleter {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        notifier: Arc<dyn NotificationService>,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            fan_out: FanOut::new(notifier, dispatch_timeout),
        }
    }
}

#[async_trait]
impl DeliveryCompletionUseCase for DeliveryCompleter {
    async fn mark_delivered(&self, order_id: &str) -> Result<Order, ApplicationError> {
        let ids = vec![order_id.to_string()];
        let mut updated = self
            .repository
            .update_status(&ids, OrderStatus::Ready, OrderStatus::Delivered)
            .await?;

        let order = updated
            .pop()
            .ok_or_else(|| ApplicationError::NotFound(order_id.to_string()))?;

        log::info!("Order {} marked delivered", order.id);

        // Best-effort delivered notification, same fan-out semantics as
        // the release path.
        let (_, failed) = self
            .fan_out
            .dispatch(std::slice::from_ref(&order), TemplateKey::Delivered)
            .await;
        if failed > 0 {
            log::warn!(
                "Delivered notification for order {} failed; status is unaffected",
                order.id
            );
        }

        Ok(order)
    }
}
