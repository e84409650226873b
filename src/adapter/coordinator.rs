// src/adapter/coordinator.rs
// Dispatch coordinator: wires the use cases together and exposes the
// operator, driver, and customer entry points over them.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::application::dto::{
    ApplicationError, BatchSummary, DeliveryStop, NewOrder, OrderProgress, ReleaseOutcome,
};
use crate::application::usecase::{
    BatchAggregationUseCase, BatchAggregator, BatchReleaseUseCase, BatchReleaser,
    DeliveryCompleter, DeliveryCompletionUseCase, OrderIntake, OrderIntakeUseCase,
};
use crate::config::Config;
use crate::domain::models::{BatchKey, Order, OrderStatus};
use crate::domain::policy::ReleasePolicy;
use crate::domain::repository::OrderRepository;
use crate::domain::service::NotificationService;

pub struct DispatchCoordinator {
    repository: Arc<dyn OrderRepository>,
    aggregator: BatchAggregator,
    policy: ReleasePolicy,
    releaser: Arc<dyn BatchReleaseUseCase>,
    completer: Arc<dyn DeliveryCompletionUseCase>,
    intake: Arc<dyn OrderIntakeUseCase>,
    delivery_fee: Decimal,
    refresh_task: Option<JoinHandle<()>>,
    running: bool,
}

impl DispatchCoordinator {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        notifier: Arc<dyn NotificationService>,
        config: &Config,
    ) -> Self {
        let policy = ReleasePolicy::new(config.batching.release_threshold);
        let dispatch_timeout = config.batching.dispatch_timeout();

        let releaser: Arc<dyn BatchReleaseUseCase> = Arc::new(BatchReleaser::new(
            repository.clone(),
            notifier.clone(),
            dispatch_timeout,
        ));
        let completer: Arc<dyn DeliveryCompletionUseCase> = Arc::new(DeliveryCompleter::new(
            repository.clone(),
            notifier,
            dispatch_timeout,
        ));
        let intake: Arc<dyn OrderIntakeUseCase> = Arc::new(OrderIntake::new(
            repository.clone(),
            policy.clone(),
            releaser.clone(),
            config.batching.auto_release,
        ));

        Self {
            aggregator: BatchAggregator::new(repository.clone()),
            repository,
            policy,
            releaser,
            completer,
            intake,
            delivery_fee: config.batching.delivery_fee,
            refresh_task: None,
            running: false,
        }
    }

    /// Start the passive change-feed consumer. Each signal triggers a full
    /// re-read and re-aggregation; the feed is at-least-once and lag only
    /// coalesces refreshes.
    pub fn start(&mut self) {
        if self.running {
            return;
        }

        let mut events = self.repository.subscribe();
        let aggregator = BatchAggregator::new(self.repository.clone());
        self.refresh_task = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        log::debug!("Order store changed: {:?}", event);
                        match aggregator.pending_batches().await {
                            Ok(batches) => {
                                log::info!("Batch view refreshed: {} open batches", batches.len())
                            }
                            Err(e) => log::error!("Failed to refresh batch view: {}", e),
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // The feed retains the newest events; the next recv
                        // picks up from there and triggers the refresh.
                        log::debug!("Change feed lagged by {} events; catching up", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            log::info!("Change feed closed; refresher stopped");
        }));

        self.running = true;
        log::info!("Dispatch coordinator started");
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }

        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }

        self.running = false;
        log::info!("Dispatch coordinator stopped");
    }

    /// Operator-facing grouped view: every open batch with its aggregate
    /// and eligibility. This view is the only legitimate input to a
    /// manual release.
    pub async fn operator_view(&self) -> Result<Vec<BatchSummary>, ApplicationError> {
        let batches = self.aggregator.pending_batches().await?;
        Ok(batches
            .into_values()
            .map(|batch| {
                let eligibility = self.policy.evaluate(&batch);
                BatchSummary {
                    delivery_date: batch.key.delivery_date,
                    store_id: batch.key.store_id.clone(),
                    order_count: batch.order_count,
                    total_value: batch.total_value,
                    eligible: eligibility.eligible,
                    remaining: eligibility.remaining,
                    order_ids: batch.order_ids(),
                }
            })
            .collect())
    }

    /// Driver-facing run sheet for one delivery date.
    pub async fn driver_view(&self, date: NaiveDate) -> Result<Vec<DeliveryStop>, ApplicationError> {
        let ready = self.repository.fetch_ready_for(date).await?;
        Ok(ready.iter().map(DeliveryStop::from).collect())
    }

    /// Customer-facing order progress, including how close a pending
    /// order's batch is to release.
    pub async fn order_progress(&self, order_id: &str) -> Result<OrderProgress, ApplicationError> {
        let order = self
            .repository
            .find(order_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(order_id.to_string()))?;

        let (batch_total, remaining) = if order.status == OrderStatus::Pending {
            let batches = self.aggregator.pending_batches().await?;
            match batches.get(&order.batch_key()) {
                Some(batch) => {
                    let eligibility = self.policy.evaluate(batch);
                    (Some(batch.total_value), Some(eligibility.remaining))
                }
                None => (None, None),
            }
        } else {
            (None, None)
        };

        Ok(OrderProgress {
            order,
            batch_total,
            remaining,
        })
    }

    /// Flat-fee revenue metric over delivered orders.
    pub async fn delivered_revenue(&self) -> Result<Decimal, ApplicationError> {
        let count = self.repository.delivered_count().await?;
        Ok(Decimal::from(count) * self.delivery_fee)
    }

    pub async fn place_order(&self, draft: NewOrder) -> Result<Order, ApplicationError> {
        self.intake.place_order(draft).await
    }

    pub async fn release_batch(&self, key: &BatchKey) -> Result<ReleaseOutcome, ApplicationError> {
        self.releaser.release_batch(key).await
    }

    pub async fn release_orders(&self, ids: &[String]) -> Result<ReleaseOutcome, ApplicationError> {
        self.releaser.release_orders(ids).await
    }

    pub async fn mark_delivered(&self, order_id: &str) -> Result<Order, ApplicationError> {
        self.completer.mark_delivered(order_id).await
    }
}

impl Drop for DispatchCoordinator {
    fn drop(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
    }
}
