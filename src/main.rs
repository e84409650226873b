// src/main.rs
use std::sync::Arc;

use tokio::signal::ctrl_c;

use batch_dispatch::adapter::coordinator::DispatchCoordinator;
use batch_dispatch::config::Config;
use batch_dispatch::domain::errors::AppResult;
use batch_dispatch::domain::repository::OrderRepository;
use batch_dispatch::infrastructure::notification::build_notifier;
use batch_dispatch::infrastructure::store::InMemoryOrderStore;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting batch_dispatch v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Release threshold: {}, auto-release: {}",
        config.batching.release_threshold,
        config.batching.auto_release
    );

    // The in-memory store stands in for the durable order store; any
    // relational backend implementing OrderRepository slots in here.
    let repository: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderStore::new());

    // Pick the notification channel (no-op when unconfigured)
    let notifier = build_notifier(&config.notification);

    // Wire the coordinator and start consuming the change feed
    let mut coordinator = DispatchCoordinator::new(repository, notifier, &config);
    coordinator.start();

    // Wait for shutdown signal
    log::info!("Dispatch engine is running. Press Ctrl+C to stop.");
    ctrl_c().await.expect("Failed to listen for control-c event");

    // Shutdown
    log::info!("Shutting down...");
    coordinator.stop();

    log::info!("Shutdown complete. Goodbye!");
    Ok(())
}
