//! Rule queries and per-occurrence exception capture.

use log::debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::recurring_errors::RecurringError;
use super::recurring_model::{
    ExceptionKind, NewRecurrenceException, RealizationOverrides, RecurrenceException,
    RecurringRule,
};
use super::recurring_traits::{RecurringRepositoryTrait, RecurringServiceTrait};
use crate::db::UnitOfWorkTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::TransactionRepositoryTrait;

/// Service exposing recurring rules and recording occurrence exceptions.
///
/// Exceptions are the only way a single occurrence is adjusted; rules
/// themselves stay immutable in amount and pattern.
pub struct RecurringService {
    recurring_repository: Arc<dyn RecurringRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    unit_of_work: Arc<dyn UnitOfWorkTrait>,
}

impl RecurringService {
    /// Creates a new RecurringService instance
    pub fn new(
        recurring_repository: Arc<dyn RecurringRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        unit_of_work: Arc<dyn UnitOfWorkTrait>,
    ) -> Self {
        Self {
            recurring_repository,
            transaction_repository,
            unit_of_work,
        }
    }

    /// Resolves a rule id to either kind, or fails with `NotFound`.
    fn require_rule(&self, rule_id: &str) -> Result<RecurringRule> {
        if let Some(rule) = self.recurring_repository.get_transaction_by_id(rule_id)? {
            return Ok(RecurringRule::Transaction(rule));
        }
        if let Some(rule) = self.recurring_repository.get_transfer_by_id(rule_id)? {
            return Ok(RecurringRule::Transfer(rule));
        }
        Err(Error::NotFound("Recurring rule".to_string()))
    }

    /// An exception only makes sense for an occurrence that has neither an
    /// existing exception nor a realized transaction.
    fn ensure_occurrence_open(
        &self,
        rule: &RecurringRule,
        instance_date: NaiveDate,
    ) -> Result<()> {
        if self
            .recurring_repository
            .get_exception(rule.id(), instance_date)?
            .is_some()
        {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "An exception already exists for this occurrence".to_string(),
            )));
        }

        let realized = match rule {
            RecurringRule::Transaction(tx) => self
                .transaction_repository
                .get_by_recurring_instance(&tx.id, instance_date)?
                .is_some(),
            RecurringRule::Transfer(transfer) => !self
                .transaction_repository
                .get_by_recurring_transfer_instance(&transfer.id, instance_date)?
                .is_empty(),
        };
        if realized {
            return Err(Error::Recurring(RecurringError::AlreadyRealized));
        }
        Ok(())
    }

    async fn record_exception(
        &self,
        new_exception: NewRecurrenceException,
    ) -> Result<RecurrenceException> {
        let exception = self.recurring_repository.add_exception(new_exception).await?;
        self.unit_of_work.save_changes().await?;
        Ok(exception)
    }
}

#[async_trait]
impl RecurringServiceTrait for RecurringService {
    fn get_active_rules(&self) -> Result<Vec<RecurringRule>> {
        self.recurring_repository.get_active()
    }

    fn get_rules_by_account(&self, account_id: &str) -> Result<Vec<RecurringRule>> {
        self.recurring_repository.get_by_account_id(account_id)
    }

    async fn skip_occurrence(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
    ) -> Result<RecurrenceException> {
        let rule = self.require_rule(rule_id)?;
        self.ensure_occurrence_open(&rule, instance_date)?;

        debug!("Skipping occurrence {} of rule {}", instance_date, rule_id);
        self.record_exception(NewRecurrenceException {
            id: None,
            rule_id: rule_id.to_string(),
            original_date: instance_date,
            kind: ExceptionKind::Skipped,
            amount: None,
            description: None,
            effective_date: None,
        })
        .await
    }

    async fn modify_occurrence(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        overrides: RealizationOverrides,
    ) -> Result<RecurrenceException> {
        if overrides.is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "At least one override is required to modify an occurrence".to_string(),
            )));
        }

        let rule = self.require_rule(rule_id)?;
        self.ensure_occurrence_open(&rule, instance_date)?;

        debug!("Modifying occurrence {} of rule {}", instance_date, rule_id);
        self.record_exception(NewRecurrenceException {
            id: None,
            rule_id: rule_id.to_string(),
            original_date: instance_date,
            kind: ExceptionKind::Modified,
            amount: overrides.amount,
            description: overrides.description,
            effective_date: overrides.date,
        })
        .await
    }
}
