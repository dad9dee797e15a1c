//! Past-due detection over a bounded lookback window.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use super::overlay::resolve_occurrence;
use super::recurring_model::{PastDueItem, PastDueReport, RecurrenceException, RecurringRule};
use super::recurring_traits::{PastDueServiceTrait, RecurringRepositoryTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::constants::{PAST_DUE_LOOKBACK_DAYS, UNRESOLVED_ACCOUNT_NAME};
use crate::errors::Result;
use crate::transactions::TransactionRepositoryTrait;

/// Service scanning active recurring rules for occurrences that are due but
/// neither skipped nor realized.
///
/// The scan is pull-based and fully recomputed per query relative to the
/// injected reference `today`; occurrences dated `today` or later are never
/// past-due, and the window is bounded at
/// [`PAST_DUE_LOOKBACK_DAYS`] days back.
pub struct PastDueService {
    recurring_repository: Arc<dyn RecurringRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
}

impl PastDueService {
    /// Creates a new PastDueService instance
    pub fn new(
        recurring_repository: Arc<dyn RecurringRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            recurring_repository,
            transaction_repository,
            account_repository,
        }
    }

    /// Best-effort account display name. A failed lookup must not suppress
    /// the past-due item, so it degrades to a placeholder.
    fn resolve_account_name(&self, account_id: &str) -> String {
        match self.account_repository.get_by_id(account_id) {
            Ok(account) => account.name,
            Err(err) => {
                warn!(
                    "Failed to resolve account {} for past-due report: {}",
                    account_id, err
                );
                UNRESOLVED_ACCOUNT_NAME.to_string()
            }
        }
    }

    /// Whether a realized row already exists for the occurrence, on every
    /// leg the rule kind requires.
    fn is_realized(&self, rule: &RecurringRule, instance_date: NaiveDate) -> Result<bool> {
        match rule {
            RecurringRule::Transaction(tx) => Ok(self
                .transaction_repository
                .get_by_recurring_instance(&tx.id, instance_date)?
                .is_some()),
            RecurringRule::Transfer(transfer) => Ok(!self
                .transaction_repository
                .get_by_recurring_transfer_instance(&transfer.id, instance_date)?
                .is_empty()),
        }
    }

    fn build_item(
        &self,
        rule: &RecurringRule,
        instance_date: NaiveDate,
        days_past_due: i64,
        amount: Decimal,
        description: String,
    ) -> PastDueItem {
        let (account_name, destination_account_name) = match rule {
            RecurringRule::Transaction(tx) => (self.resolve_account_name(&tx.account_id), None),
            RecurringRule::Transfer(transfer) => (
                self.resolve_account_name(&transfer.source_account_id),
                Some(self.resolve_account_name(&transfer.destination_account_id)),
            ),
        };

        PastDueItem {
            rule_id: rule.id().to_string(),
            rule_type: rule.rule_type(),
            instance_date,
            days_past_due,
            description,
            amount,
            currency: rule.currency().to_string(),
            account_name,
            destination_account_name,
        }
    }
}

impl PastDueServiceTrait for PastDueService {
    fn check_past_due(
        &self,
        account_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<PastDueReport> {
        let rules = match account_id {
            Some(id) => self.recurring_repository.get_by_account_id(id)?,
            None => self.recurring_repository.get_active()?,
        };

        let window_start = today - Duration::days(PAST_DUE_LOOKBACK_DAYS);
        // An occurrence dated exactly `today` is not yet past-due.
        let Some(window_end) = today.pred_opt() else {
            return Ok(PastDueReport {
                items: Vec::new(),
                total_count: 0,
                oldest_date: None,
                total_amount: None,
            });
        };

        let mut items = Vec::new();

        for rule in rules.iter().filter(|r| r.is_active()) {
            let exceptions: HashMap<NaiveDate, RecurrenceException> = self
                .recurring_repository
                .get_exceptions_in_range(rule.id(), window_start, window_end)?
                .into_iter()
                .map(|exception| (exception.original_date, exception))
                .collect();

            for instance_date in rule.occurrences_between(window_start, window_end) {
                let resolution = resolve_occurrence(
                    instance_date,
                    rule.amount(),
                    rule.description(),
                    exceptions.get(&instance_date),
                    None,
                );
                let Some(effective) = resolution.into_effective() else {
                    continue;
                };

                if self.is_realized(rule, instance_date)? {
                    continue;
                }

                // Days overdue count from the ORIGINAL occurrence date, not
                // any overridden effective date.
                let days_past_due = (today - instance_date).num_days();
                items.push(self.build_item(
                    rule,
                    instance_date,
                    days_past_due,
                    effective.amount,
                    effective.description,
                ));
            }
        }

        items.sort_by(|a, b| {
            a.instance_date
                .cmp(&b.instance_date)
                .then_with(|| a.description.cmp(&b.description))
        });

        let total_count = items.len();
        let oldest_date = items.first().map(|item| item.instance_date);
        let total_amount = if items.is_empty() {
            None
        } else {
            Some(items.iter().map(|item| item.amount).sum())
        };

        debug!(
            "Past-due scan relative to {}: {} item(s), oldest {:?}",
            today, total_count, oldest_date
        );

        Ok(PastDueReport {
            items,
            total_count,
            oldest_date,
            total_amount,
        })
    }
}
