//! Account repository trait.
//!
//! The engine consumes accounts read-only; the full account lifecycle is
//! owned by the management layer and its storage implementation.

use super::accounts_model::Account;
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
///
/// Implementations are database-agnostic; lookups for missing accounts
/// surface as [`crate::errors::DatabaseError::NotFound`].
pub trait AccountRepositoryTrait: Send + Sync {
    /// Retrieves an account by its ID.
    fn get_by_id(&self, account_id: &str) -> Result<Account>;

    /// Lists all accounts.
    fn get_all(&self) -> Result<Vec<Account>>;
}
