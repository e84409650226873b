pub mod aggregation;
pub mod delivery;
pub mod intake;
pub mod release;

// Re-export public API
pub use aggregation::{group_pending, BatchAggregationUseCase, BatchAggregator};
pub use delivery::{DeliveryCompleter, DeliveryCompletionUseCase};
pub use intake::{OrderIntake, OrderIntakeUseCase};
pub use release::{BatchReleaseUseCase, BatchReleaser, FanOut};
