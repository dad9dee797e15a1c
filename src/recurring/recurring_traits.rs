//! Recurring repository and service traits.
//!
//! These traits define the contract for recurring rule operations without
//! any database-specific types, allowing for different storage
//! implementations.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::recurring_model::{
    NewRecurrenceException, PastDueReport, RealizationOverrides, RecurrenceException,
    RecurringRule, RecurringTransaction, RecurringTransfer, TransferRealization,
};
use crate::errors::Result;
use crate::transactions::Transaction;

/// Trait defining the contract for recurring rule store operations.
#[async_trait]
pub trait RecurringRepositoryTrait: Send + Sync {
    /// All active rules, both transactions and transfers.
    fn get_active(&self) -> Result<Vec<RecurringRule>>;

    /// Active rules the account participates in (as the transaction account,
    /// or as either side of a transfer).
    fn get_by_account_id(&self, account_id: &str) -> Result<Vec<RecurringRule>>;

    /// Looks up a recurring transaction rule by id.
    fn get_transaction_by_id(&self, rule_id: &str) -> Result<Option<RecurringTransaction>>;

    /// Looks up a recurring transfer rule by id.
    fn get_transfer_by_id(&self, rule_id: &str) -> Result<Option<RecurringTransfer>>;

    /// The exception for one occurrence, if any. At most one exception
    /// exists per `(rule_id, original_date)`.
    fn get_exception(
        &self,
        rule_id: &str,
        original_date: NaiveDate,
    ) -> Result<Option<RecurrenceException>>;

    /// All exceptions for a rule whose original date falls in the inclusive
    /// range.
    fn get_exceptions_in_range(
        &self,
        rule_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RecurrenceException>>;

    /// Stages a new exception for the current unit of work.
    async fn add_exception(
        &self,
        new_exception: NewRecurrenceException,
    ) -> Result<RecurrenceException>;
}

/// Trait defining the contract for occurrence realization.
#[async_trait]
pub trait RealizationServiceTrait: Send + Sync {
    /// Converts one recurring transaction occurrence into a permanent ledger
    /// row, exactly once per `(rule_id, instance_date)`.
    async fn realize_transaction(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        overrides: Option<RealizationOverrides>,
    ) -> Result<Transaction>;

    /// Converts one recurring transfer occurrence into two linked ledger
    /// rows (debit source, credit destination) in a single atomic commit.
    async fn realize_transfer(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        overrides: Option<RealizationOverrides>,
    ) -> Result<TransferRealization>;
}

/// Trait defining the contract for past-due detection.
pub trait PastDueServiceTrait: Send + Sync {
    /// Scans active rules for occurrences that are due but not yet realized
    /// inside the fixed lookback window, relative to the injected `today`.
    fn check_past_due(&self, account_id: Option<&str>, today: NaiveDate)
        -> Result<PastDueReport>;
}

/// Trait defining the contract for rule queries and exception capture.
#[async_trait]
pub trait RecurringServiceTrait: Send + Sync {
    fn get_active_rules(&self) -> Result<Vec<RecurringRule>>;

    fn get_rules_by_account(&self, account_id: &str) -> Result<Vec<RecurringRule>>;

    /// Records a `Skipped` exception for one occurrence.
    async fn skip_occurrence(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
    ) -> Result<RecurrenceException>;

    /// Records a `Modified` exception carrying the supplied overrides.
    async fn modify_occurrence(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        overrides: RealizationOverrides,
    ) -> Result<RecurrenceException>;
}
