//! Idempotent realization of recurring occurrences into ledger rows.

use log::debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::overlay::{resolve_occurrence, EffectiveOccurrence};
use super::recurring_errors::RecurringError;
use super::recurring_model::{RealizationOverrides, TransferRealization};
use super::recurring_traits::{RealizationServiceTrait, RecurringRepositoryTrait};
use crate::db::UnitOfWorkTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::transactions::{NewTransaction, Transaction, TransactionRepositoryTrait};

/// Service converting occurrences into permanent ledger transactions.
///
/// Staged rows always carry the ORIGINAL `instance_date` in their recurring
/// linkage, even when the posted date was overridden - the idempotency key
/// must stay stable under date overrides.
pub struct RealizationService {
    recurring_repository: Arc<dyn RecurringRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    unit_of_work: Arc<dyn UnitOfWorkTrait>,
}

impl RealizationService {
    /// Creates a new RealizationService instance
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

    /// Resolves the overlay for one occurrence, refusing skipped instances.
    fn resolve_effective(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        default_amount: Decimal,
        default_description: &str,
        overrides: Option<&RealizationOverrides>,
    ) -> Result<EffectiveOccurrence> {
        let exception = self
            .recurring_repository
            .get_exception(rule_id, instance_date)?;

        resolve_occurrence(
            instance_date,
            default_amount,
            default_description,
            exception.as_ref(),
            overrides,
        )
        .into_effective()
        .ok_or_else(|| Error::Recurring(RecurringError::InstanceSkipped))
    }

    /// Concurrent realizations race to the same uniqueness constraint on
    /// `(rule_id, instance_date)`; the loser sees the violation at commit
    /// time and must report it as the domain error.
    fn map_commit_error(err: Error) -> Error {
        match err {
            Error::Database(DatabaseError::UniqueViolation(_)) => {
                Error::Recurring(RecurringError::AlreadyRealized)
            }
            other => other,
        }
    }
}

#[async_trait]
impl RealizationServiceTrait for RealizationService {
    async fn realize_transaction(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        overrides: Option<RealizationOverrides>,
    ) -> Result<Transaction> {
        let rule = self
            .recurring_repository
            .get_transaction_by_id(rule_id)?
            .ok_or_else(|| Error::NotFound("Recurring transaction".to_string()))?;

        if self
            .transaction_repository
            .get_by_recurring_instance(rule_id, instance_date)?
            .is_some()
        {
            return Err(Error::Recurring(RecurringError::AlreadyRealized));
        }

        let effective = self.resolve_effective(
            rule_id,
            instance_date,
            rule.amount,
            &rule.description,
            overrides.as_ref(),
        )?;

        debug!(
            "Realizing recurring transaction {} for instance {} on {}",
            rule_id, instance_date, effective.date
        );

        let transaction = self
            .transaction_repository
            .add(NewTransaction {
                id: None,
                account_id: rule.account_id.clone(),
                amount: effective.amount,
                currency: rule.currency.clone(),
                description: effective.description,
                transaction_date: effective.date,
                category_id: None,
                recurring_rule_id: Some(rule.id.clone()),
                recurring_instance_date: Some(instance_date),
                transfer_group_id: None,
            })
            .await?;

        self.unit_of_work
            .save_changes()
            .await
            .map_err(Self::map_commit_error)?;

        Ok(transaction)
    }

    async fn realize_transfer(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
        overrides: Option<RealizationOverrides>,
    ) -> Result<TransferRealization> {
        let rule = self
            .recurring_repository
            .get_transfer_by_id(rule_id)?
            .ok_or_else(|| Error::NotFound("Recurring transfer".to_string()))?;

        // The source leg is the authoritative idempotency check; legs only
        // ever exist in atomically-written pairs.
        if !self
            .transaction_repository
            .get_by_recurring_transfer_instance(rule_id, instance_date)?
            .is_empty()
        {
            return Err(Error::Recurring(RecurringError::AlreadyRealized));
        }

        let effective = self.resolve_effective(
            rule_id,
            instance_date,
            rule.amount,
            &rule.description,
            overrides.as_ref(),
        )?;

        let transfer_group_id = uuid::Uuid::new_v4().to_string();
        debug!(
            "Realizing recurring transfer {} for instance {} (group {})",
            rule_id, instance_date, transfer_group_id
        );

        let source = self
            .transaction_repository
            .add(NewTransaction {
                id: None,
                account_id: rule.source_account_id.clone(),
                amount: -effective.amount,
                currency: rule.currency.clone(),
                description: effective.description.clone(),
                transaction_date: effective.date,
                category_id: None,
                recurring_rule_id: Some(rule.id.clone()),
                recurring_instance_date: Some(instance_date),
                transfer_group_id: Some(transfer_group_id.clone()),
            })
            .await?;

        let destination = self
            .transaction_repository
            .add(NewTransaction {
                id: None,
                account_id: rule.destination_account_id.clone(),
                amount: effective.amount,
                currency: rule.currency.clone(),
                description: effective.description,
                transaction_date: effective.date,
                category_id: None,
                recurring_rule_id: Some(rule.id.clone()),
                recurring_instance_date: Some(instance_date),
                transfer_group_id: Some(transfer_group_id),
            })
            .await?;

        self.unit_of_work
            .save_changes()
            .await
            .map_err(Self::map_commit_error)?;

        Ok(TransferRealization {
            source_transaction_id: source.id,
            destination_transaction_id: destination.id,
            amount: effective.amount,
            date: effective.date,
        })
    }
}
