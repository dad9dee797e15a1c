//! Transaction repository trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::transactions_model::{DailyTotal, NewTransaction, Transaction};
use crate::errors::Result;

/// Trait defining the contract for ledger transaction repository operations.
///
/// Reads are synchronous lookups; `add` stages a row that only becomes
/// permanent once the surrounding [`crate::db::UnitOfWorkTrait`] commits.
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Retrieves transactions in the inclusive date range, optionally
    /// restricted to one account.
    fn get_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<&str>,
    ) -> Result<Vec<Transaction>>;

    /// Per-day amount/count aggregates for one calendar month.
    fn get_daily_totals(
        &self,
        year: i32,
        month: u32,
        account_id: Option<&str>,
    ) -> Result<Vec<DailyTotal>>;

    /// Finds the realized row for a plain recurring occurrence, if any.
    fn get_by_recurring_instance(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
    ) -> Result<Option<Transaction>>;

    /// Finds the realized legs for a recurring transfer occurrence.
    ///
    /// Legs are written atomically in pairs; any surviving leg marks the
    /// occurrence realized.
    fn get_by_recurring_transfer_instance(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
    ) -> Result<Vec<Transaction>>;

    /// Stages a new transaction for the current unit of work.
    async fn add(&self, new_transaction: NewTransaction) -> Result<Transaction>;
}
