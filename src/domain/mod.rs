// src/domain/mod.rs
// Domain layer: models, errors, release policy, and the seams to the
// order store and notification channel.

pub mod errors;
pub mod models;
pub mod policy;
pub mod repository;
pub mod service;
