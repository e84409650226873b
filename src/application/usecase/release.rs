// src/application/usecase/release.rs
// Batch release transition and notification fan-out

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::application::dto::{ApplicationError, ReleaseOutcome};
use crate::application::usecase::aggregation::group_pending;
use crate::domain::errors::NotificationError;
use crate::domain::models::{BatchKey, Order, OrderStatus};
use crate::domain::repository::OrderRepository;
use crate::domain::service::{NotificationContext, NotificationService, TemplateKey};

/// Fire-and-forget notification fan-out: one independent dispatch per
/// order, run concurrently with no ordering guarantee, joined only for
/// completion timing. A failure or timeout on one dispatch is logged and
/// counted; it never aborts siblings and never touches committed status.
pub struct FanOut {
    notifier: Arc<dyn NotificationService>,
    dispatch_timeout: Duration,
}

impl FanOut {
    pub fn new(notifier: Arc<dyn NotificationService>, dispatch_timeout: Duration) -> Self {
        Self {
            notifier,
            dispatch_timeout,
        }
    }

    /// Returns (sent, failed) counts.
    pub async fn dispatch(&self, orders: &[Order], template: TemplateKey) -> (usize, usize) {
        let attempts = orders.iter().map(|order| {
            let notifier = self.notifier.clone();
            let timeout = self.dispatch_timeout;
            let to = order.customer_email.clone();
            let context = NotificationContext {
                order_id: order.id.clone(),
                customer_name: order.customer_name.clone(),
            };
            async move {
                match tokio::time::timeout(timeout, notifier.send(&to, template, &context)).await
                {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        log::warn!(
                            "Notification for order {} ({}) failed: {}",
                            context.order_id,
                            template.as_str(),
                            e
                        );
                        false
                    }
                    Err(_) => {
                        log::warn!(
                            "Notification for order {} ({}) failed: {}",
                            context.order_id,
                            template.as_str(),
                            NotificationError::Timeout(timeout)
                        );
                        false
                    }
                }
            }
        });

        let results = join_all(attempts).await;
        let sent = results.iter().filter(|ok| **ok).count();
        (sent, results.len() - sent)
    }
}

#[async_trait]
pub trait BatchReleaseUseCase: Send + Sync {
    /// Release the current pending members of one batch. The member id
    /// list is captured here, at decision time; the commit is against
    /// that explicit list, never re-derived.
    async fn release_batch(&self, key: &BatchKey) -> Result<ReleaseOutcome, ApplicationError>;

    /// Release an explicit id set, e.g. the one an operator was shown.
    async fn release_orders(&self, ids: &[String]) -> Result<ReleaseOutcome, ApplicationError>;
}

pub struct BatchReleaser {
    repository: Arc<dyn OrderRepository>,
    fan_out: FanOut,
}

impl BatchReleaser {
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
impl BatchReleaseUseCase for BatchReleaser {
    async fn release_batch(&self, key: &BatchKey) -> Result<ReleaseOutcome, ApplicationError> {
        let pending = self.repository.fetch_pending().await?;
        let mut batches = group_pending(pending);
        let batch = batches
            .remove(key)
            .ok_or_else(|| ApplicationError::EmptyBatch(key.to_string()))?;

        self.release_orders(&batch.order_ids()).await
    }

    async fn release_orders(&self, ids: &[String]) -> Result<ReleaseOutcome, ApplicationError> {
        if ids.is_empty() {
            return Err(ApplicationError::Validation(
                "release requires at least one order id".into(),
            ));
        }

        // All-or-nothing status commit. A concurrent release of the same
        // orders loses here with a conflict listing the stale ids.
        let released = self
            .repository
            .update_status(ids, OrderStatus::Pending, OrderStatus::Ready)
            .await?;

        log::info!("Released batch of {} orders", released.len());

        // Status is durable at this point; dispatch outcome is reported
        // but has no bearing on the committed transition.
        let (notified, failed) = self.fan_out.dispatch(&released, TemplateKey::Ready).await;
        if failed > 0 {
            log::warn!(
                "{} of {} release notifications failed; order status is unaffected",
                failed,
                released.len()
            );
        }

        Ok(ReleaseOutcome {
            orders: released,
            notified,
            failed,
        })
    }
}
