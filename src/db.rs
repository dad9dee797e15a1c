//! Unit-of-work abstraction.
//!
//! Mutating services stage writes through their repositories and commit them
//! in one atomic unit via this trait. Storage crates implement it on top of
//! their native transaction mechanism.

use async_trait::async_trait;

use crate::errors::Result;

/// Trait defining the atomic commit boundary for staged writes.
///
/// A realization or exception capture stages its rows first and then calls
/// `save_changes` exactly once; on any failure before commit nothing is
/// persisted. Implementations must surface uniqueness violations as
/// [`crate::errors::DatabaseError::UniqueViolation`] so callers can translate
/// commit-time races into domain errors.
#[async_trait]
pub trait UnitOfWorkTrait: Send + Sync {
    /// Commits all staged writes atomically.
    ///
    /// Returns the number of affected rows.
    async fn save_changes(&self) -> Result<usize>;
}
