// src/domain/policy.rs
// Release threshold rule

use crate::domain::models::{Batch, Eligibility};
use rust_decimal::Decimal;

/// Decides *whether* a batch may currently be released, never *when*.
/// The threshold comes from configuration; triggering stays an explicit
/// action by the operator or the intake auto-release check.
#[derive(Debug, Clone)]
pub struct ReleasePolicy {
    threshold: Decimal,
}

impl ReleasePolicy {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// A batch exactly at the threshold is eligible. Empty batches never
    /// reach this point; they do not exist as aggregates.
    pub fn evaluate(&self, batch: &Batch) -> Eligibility {
        let eligible = batch.total_value >= self.threshold;
        let remaining = if eligible {
            Decimal::ZERO
        } else {
            self.threshold - batch.total_value
        };
        Eligibility {
            eligible,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::BatchKey;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn batch_with_total(total: Decimal) -> Batch {
        Batch {
            key: BatchKey {
                delivery_date: NaiveDate::from_ymd_opt(2025, 12, 24).unwrap(),
                store_id: "store-A".into(),
            },
            orders: Vec::new(),
            order_count: 0,
            total_value: total,
        }
    }

    #[test]
    fn below_threshold_reports_remaining() {
        let policy = ReleasePolicy::new(dec!(100.00));
        let result = policy.evaluate(&batch_with_total(dec!(75.00)));
        assert!(!result.eligible);
        assert_eq!(result.remaining, dec!(25.00));
    }

    #[test]
    fn exactly_at_threshold_is_eligible() {
        let policy = ReleasePolicy::new(dec!(100.00));
        let result = policy.evaluate(&batch_with_total(dec!(100.00)));
        assert!(result.eligible);
        assert_eq!(result.remaining, Decimal::ZERO);
    }

    #[test]
    fn above_threshold_floors_remaining_at_zero() {
        let policy = ReleasePolicy::new(dec!(100.00));
        let result = policy.evaluate(&batch_with_total(dec!(105.00)));
        assert!(result.eligible);
        assert_eq!(result.remaining, Decimal::ZERO);
    }
}
