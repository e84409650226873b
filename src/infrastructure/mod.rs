// src/infrastructure/mod.rs
pub mod notification;
pub mod store;
