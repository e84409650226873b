// src/domain/service/mod.rs
// Notification channel seam

use async_trait::async_trait;

use crate::domain::errors::NotificationError;

/// Message template selector, keyed by the status the order just reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKey {
    Ready,
    Delivered,
}

impl TemplateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKey::Ready => "ready",
            TemplateKey::Delivered => "delivered",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            TemplateKey::Ready => "Order Update: READY",
            TemplateKey::Delivered => "Order Update: DELIVERED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TemplateKey::Ready => "Your order is being prepared and will be delivered soon!",
            TemplateKey::Delivered => {
                "Your order has been delivered. Thank you for shopping with us!"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationContext {
    pub order_id: String,
    pub customer_name: String,
}

/// Outbound customer notification channel. Dispatch is best-effort by
/// contract: callers log failures and move on, and an unconfigured
/// channel reports success trivially rather than erroring.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(
        &self,
        to: &str,
        template: TemplateKey,
        context: &NotificationContext,
    ) -> Result<(), NotificationError>;
}
