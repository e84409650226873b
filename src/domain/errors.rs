// src/domain/errors.rs
use crate::domain::models::OrderStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Application error: {0}")]
    Application(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by the order store seam.
#[derive(Error, Debug)]
pub enum StoreError {
    /// One or more targeted orders have already left the expected status.
    /// The whole multi-order update fails atomically; no row changes.
    #[error("Orders no longer {expected}: {stale_ids:?}")]
    Conflict {
        expected: OrderStatus,
        stale_ids: Vec<String>,
    },

    #[error("Duplicate order id: {0}")]
    Duplicate(String),

    /// The store read/write failed entirely. Fatal to the requested
    /// operation; no partial commit is attempted.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from a single notification dispatch. Always recovered locally:
/// logged and counted, never rolled into the enclosing transition's result.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification channel error: {0}")]
    Channel(String),

    #[error("Rejected by provider: {0}")]
    Rejected(String),

    #[error("Dispatch timed out after {0:?}")]
    Timeout(Duration),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type StoreResult<T> = Result<T, StoreError>;
