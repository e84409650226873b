// src/adapter/mod.rs
pub mod coordinator;
