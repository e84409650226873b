// src/application/usecase/intake.rs
// Checkout-side order intake and the reactive auto-release check

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::application::dto::{ApplicationError, NewOrder};
use crate::application::usecase::aggregation::group_pending;
use crate::application::usecase::release::BatchReleaseUseCase;
use crate::domain::models::{Order, OrderStatus};
use crate::domain::policy::ReleasePolicy;
use crate::domain::repository::OrderRepository;

#[async_trait]
pub trait OrderIntakeUseCase: Send + Sync {
    /// Validate and persist a draft order as `Pending`. The line-item
    /// snapshot is taken as-is; the total is recomputed here as the exact
    /// decimal sum of the snapshot, never trusted from the client.
    async fn place_order(&self, draft: NewOrder) -> Result<Order, ApplicationError>;
}

pub struct OrderIntake {
    repository: Arc<dyn OrderRepository>,
    policy: ReleasePolicy,
    releaser: Arc<dyn BatchReleaseUseCase>,
    auto_release: bool,
    sequence: AtomicU64,
}

impl OrderIntake {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        policy: ReleasePolicy,
        releaser: Arc<dyn BatchReleaseUseCase>,
        auto_release: bool,
    ) -> Self {
        Self {
            repository,
            policy,
            releaser,
            auto_release,
            sequence: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("ord-{}-{:04}", Utc::now().timestamp_millis(), seq)
    }

    fn validate(draft: &NewOrder) -> Result<(), ApplicationError> {
        if draft.items.is_empty() {
            return Err(ApplicationError::Validation("cart is empty".into()));
        }
        for (field, value) in [
            ("customer_name", &draft.customer_name),
            ("customer_email", &draft.customer_email),
            ("customer_phone", &draft.customer_phone),
            ("delivery_address", &draft.delivery_address),
            ("store_id", &draft.store_id),
        ] {
            if value.trim().is_empty() {
                return Err(ApplicationError::Validation(format!(
                    "missing field: {}",
                    field
                )));
            }
        }
        // Orders are batched for a future delivery day; earliest is tomorrow.
        if draft.delivery_date <= Utc::now().date_naive() {
            return Err(ApplicationError::Validation(
                "delivery date must be after today".into(),
            ));
        }
        Ok(())
    }

    /// Reactive counterpart to the operator's manual release: after every
    /// accepted order, re-evaluate its batch and trigger the same atomic
    /// transition the instant the threshold is first crossed. Sharing the
    /// transition's precondition means a concurrent manual release cannot
    /// race this into a double release.
    async fn maybe_auto_release(&self, order: &Order) -> Result<(), ApplicationError> {
        let pending = self.repository.fetch_pending().await?;
        let batches = group_pending(pending);
        let batch = match batches.get(&order.batch_key()) {
            Some(batch) => batch,
            None => return Ok(()),
        };

        if !self.policy.evaluate(batch).eligible {
            return Ok(());
        }

        match self.releaser.release_orders(&batch.order_ids()).await {
            Ok(outcome) => {
                log::info!(
                    "Auto-released batch {} ({} orders)",
                    batch.key,
                    outcome.orders.len()
                );
                Ok(())
            }
            // Lost the race to a concurrent trigger; the batch is already
            // on its way.
            Err(ApplicationError::StateConflict { .. }) => {
                log::debug!("Auto-release of batch {} lost to a concurrent release", batch.key);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl OrderIntakeUseCase for OrderIntake {
    async fn place_order(&self, draft: NewOrder) -> Result<Order, ApplicationError> {
        Self::validate(&draft)?;

        let total: Decimal = draft.items.iter().map(|item| item.line_total()).sum();
        let order = Order {
            id: self.next_id(),
            store_id: draft.store_id,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_phone: draft.customer_phone,
            delivery_address: draft.delivery_address,
            delivery_date: draft.delivery_date,
            items: draft.items,
            total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        self.repository.insert(order.clone()).await?;
        log::info!(
            "Accepted order {} for batch {} (total {})",
            order.id,
            order.batch_key(),
            order.total
        );

        if self.auto_release {
            // The order is already durable; a failed trigger leaves it
            // pending for a manual release rather than failing intake.
            if let Err(e) = self.maybe_auto_release(&order).await {
                log::error!("Auto-release check for order {} failed: {}", order.id, e);
            }
            // The order may have just been released with its batch.
            if let Some(current) = self.repository.find(&order.id).await? {
                return Ok(current);
            }
        }

        Ok(order)
    }
}
