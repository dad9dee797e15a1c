//! Recurring domain errors.
//!
//! The message texts are stable contracts surfaced directly to callers;
//! match on the variant, not the string.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurringError {
    /// Idempotency violation: the occurrence already has a realized
    /// transaction for its `(rule_id, instance_date)` key.
    #[error("This instance has already been realized.")]
    AlreadyRealized,

    /// The occurrence carries a `Skipped` exception.
    #[error("This instance has been skipped.")]
    InstanceSkipped,
}
