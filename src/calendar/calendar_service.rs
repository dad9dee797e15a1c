//! Calendar grid, day detail, and account timeline projections.

use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use super::calendar_model::{
    AccountTransactionList, CalendarDay, CalendarGrid, DayDetail, DayDetailItem, MonthSummary,
    TimelineItem,
};
use super::calendar_traits::CalendarServiceTrait;
use crate::accounts::AccountRepositoryTrait;
use crate::constants::{
    CALENDAR_GRID_SIZE, OCCURRENCE_WINDOW_PADDING_DAYS, UNRESOLVED_ACCOUNT_NAME,
};
use crate::errors::{DatabaseError, Error, Result, ValidationError};
use crate::recurring::{resolve_occurrence, RecurringRepositoryTrait, RecurringRule};
use crate::transactions::{Transaction, TransactionRepositoryTrait};

/// One account-level effect of a projected (not-yet-realized) occurrence.
///
/// A recurring transaction yields one leg; a transfer yields a debit leg on
/// the source account and a credit leg on the destination, mirroring the
/// ledger rows its realization would create.
#[derive(Debug, Clone)]
struct ProjectedLeg {
    rule_id: String,
    effective_date: NaiveDate,
    account_id: String,
    amount: Decimal,
    currency: String,
    description: String,
}

/// Service merging actual per-day ledger data with projected recurring
/// occurrences into calendar and account views.
pub struct CalendarService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    recurring_repository: Arc<dyn RecurringRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
}

impl CalendarService {
    /// Creates a new CalendarService instance
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        recurring_repository: Arc<dyn RecurringRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
    ) -> Self {
        Self {
            transaction_repository,
            recurring_repository,
            account_repository,
        }
    }

    fn resolve_account_name(&self, account_id: &str) -> String {
        match self.account_repository.get_by_id(account_id) {
            Ok(account) => account.name,
            Err(err) => {
                warn!(
                    "Failed to resolve account {} for calendar view: {}",
                    account_id, err
                );
                UNRESOLVED_ACCOUNT_NAME.to_string()
            }
        }
    }

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

    /// Expands the given rules into per-account projected legs whose
    /// effective date lands inside `[window_start, window_end]`.
    ///
    /// The raw expansion window is padded so a date-modified exception
    /// cannot move an occurrence out of sight. Skipped and already-realized
    /// occurrences are excluded - realized amounts always take precedence
    /// over projected ones for the same `(rule, date)`.
    fn project_legs(
        &self,
        rules: &[RecurringRule],
        window_start: NaiveDate,
        window_end: NaiveDate,
        account_filter: Option<&str>,
    ) -> Result<Vec<ProjectedLeg>> {
        let padded_start = window_start - Duration::days(OCCURRENCE_WINDOW_PADDING_DAYS);
        let padded_end = window_end + Duration::days(OCCURRENCE_WINDOW_PADDING_DAYS);

        let mut legs = Vec::new();

        for rule in rules.iter().filter(|r| r.is_active()) {
            let exceptions: HashMap<NaiveDate, _> = self
                .recurring_repository
                .get_exceptions_in_range(rule.id(), padded_start, padded_end)?
                .into_iter()
                .map(|exception| (exception.original_date, exception))
                .collect();

            for instance_date in rule.occurrences_between(padded_start, padded_end) {
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
                if effective.date < window_start || effective.date > window_end {
                    continue;
                }
                if self.is_realized(rule, instance_date)? {
                    continue;
                }

                let accounts: Vec<(String, Decimal)> = match rule {
                    RecurringRule::Transaction(tx) => {
                        vec![(tx.account_id.clone(), effective.amount)]
                    }
                    RecurringRule::Transfer(transfer) => vec![
                        (transfer.source_account_id.clone(), -effective.amount),
                        (transfer.destination_account_id.clone(), effective.amount),
                    ],
                };

                for (account_id, amount) in accounts {
                    if account_filter.map_or(false, |filter| filter != account_id) {
                        continue;
                    }
                    legs.push(ProjectedLeg {
                        rule_id: rule.id().to_string(),
                        effective_date: effective.date,
                        account_id,
                        amount,
                        currency: rule.currency().to_string(),
                        description: effective.description.clone(),
                    });
                }
            }
        }

        Ok(legs)
    }

    fn load_rules(&self, account_id: Option<&str>) -> Result<Vec<RecurringRule>> {
        match account_id {
            Some(id) => self.recurring_repository.get_by_account_id(id),
            None => self.recurring_repository.get_active(),
        }
    }

    fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid calendar month: {}-{}",
                year, month
            )))
        })?;
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Invalid calendar month: {}-{}",
                    year, month
                )))
            })?;
        Ok((first, last))
    }

    /// Previous/target/next month daily totals keyed by date; together they
    /// cover every cell the grid can show.
    fn load_daily_totals(
        &self,
        year: i32,
        month: u32,
        account_id: Option<&str>,
    ) -> Result<HashMap<NaiveDate, (Decimal, i64)>> {
        let previous = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        let next = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let mut totals = HashMap::new();
        for (y, m) in [previous, (year, month), next] {
            for daily in self.transaction_repository.get_daily_totals(y, m, account_id)? {
                totals.insert(daily.date, (daily.amount, daily.count));
            }
        }
        Ok(totals)
    }
}

impl CalendarServiceTrait for CalendarService {
    fn get_calendar_grid(
        &self,
        year: i32,
        month: u32,
        account_id: Option<&str>,
    ) -> Result<CalendarGrid> {
        let (first_of_month, last_of_month) = Self::month_bounds(year, month)?;

        // Weeks start on Sunday; the grid is always 6 full weeks.
        let offset = i64::from(first_of_month.weekday().num_days_from_sunday());
        let grid_start = first_of_month - Duration::days(offset);
        let grid_end = grid_start + Duration::days(CALENDAR_GRID_SIZE as i64 - 1);

        let totals = self.load_daily_totals(year, month, account_id)?;

        let rules = self.load_rules(account_id)?;
        let legs = self.project_legs(&rules, grid_start, grid_end, account_id)?;
        let mut projected: HashMap<NaiveDate, (Decimal, i64)> = HashMap::new();
        for leg in &legs {
            let entry = projected
                .entry(leg.effective_date)
                .or_insert((Decimal::ZERO, 0));
            entry.0 += leg.amount;
            entry.1 += 1;
        }

        let days = crate::utils::time_utils::get_days_between(grid_start, grid_end)
            .into_iter()
            .map(|date| {
                let (actual_amount, actual_count) =
                    totals.get(&date).copied().unwrap_or((Decimal::ZERO, 0));
                let (projected_amount, projected_count) =
                    projected.get(&date).copied().unwrap_or((Decimal::ZERO, 0));
                CalendarDay {
                    date,
                    is_current_month: date.year() == year && date.month() == month,
                    actual_amount,
                    actual_count,
                    projected_amount,
                    projected_count,
                }
            })
            .collect();

        // Summary from the individual realized rows of the target month, so
        // income and expenses split instead of netting per day.
        let month_transactions = self.transaction_repository.get_by_date_range(
            first_of_month,
            last_of_month,
            account_id,
        )?;
        let total_income: Decimal = month_transactions
            .iter()
            .filter(|tx| tx.amount > Decimal::ZERO)
            .map(|tx| tx.amount)
            .sum();
        let total_expenses: Decimal = month_transactions
            .iter()
            .filter(|tx| tx.amount < Decimal::ZERO)
            .map(|tx| tx.amount)
            .sum();

        Ok(CalendarGrid {
            year,
            month,
            days,
            summary: MonthSummary {
                total_income,
                total_expenses,
                net_change: total_income + total_expenses,
            },
        })
    }

    fn get_day_detail(&self, date: NaiveDate, account_id: Option<&str>) -> Result<DayDetail> {
        let transactions =
            self.transaction_repository
                .get_by_date_range(date, date, account_id)?;

        let mut items: Vec<DayDetailItem> = transactions
            .iter()
            .map(|tx| DayDetailItem {
                description: tx.description.clone(),
                amount: tx.amount,
                currency: tx.currency.clone(),
                account_id: tx.account_id.clone(),
                account_name: self.resolve_account_name(&tx.account_id),
                is_projected: false,
                transaction_id: Some(tx.id.clone()),
                rule_id: tx.recurring_rule_id.clone(),
            })
            .collect();

        let rules = self.load_rules(account_id)?;
        for leg in self.project_legs(&rules, date, date, account_id)? {
            items.push(DayDetailItem {
                description: leg.description,
                amount: leg.amount,
                currency: leg.currency,
                account_id: leg.account_id.clone(),
                account_name: self.resolve_account_name(&leg.account_id),
                is_projected: true,
                transaction_id: None,
                rule_id: Some(leg.rule_id),
            });
        }

        items.sort_by(|a, b| {
            a.is_projected
                .cmp(&b.is_projected)
                .then_with(|| a.description.cmp(&b.description))
        });

        let total_actual: Decimal = items
            .iter()
            .filter(|item| !item.is_projected)
            .map(|item| item.amount)
            .sum();
        let total_projected: Decimal = items
            .iter()
            .filter(|item| item.is_projected)
            .map(|item| item.amount)
            .sum();

        Ok(DayDetail {
            date,
            item_count: items.len(),
            total_actual,
            total_projected,
            total_combined: total_actual + total_projected,
            items,
        })
    }

    fn get_account_transaction_list(
        &self,
        account_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        include_recurring: bool,
        today: NaiveDate,
    ) -> Result<AccountTransactionList> {
        let account = self
            .account_repository
            .get_by_id(account_id)
            .map_err(|err| match err {
                Error::Database(DatabaseError::NotFound(_)) => {
                    Error::NotFound("Account".to_string())
                }
                other => other,
            })?;

        let realized: Vec<Transaction> =
            self.transaction_repository
                .get_by_date_range(from, to, Some(account_id))?;

        let mut items: Vec<TimelineItem> = realized
            .iter()
            .map(|tx| TimelineItem {
                date: tx.transaction_date,
                description: tx.description.clone(),
                amount: tx.amount,
                is_projected: false,
                transaction_id: Some(tx.id.clone()),
                rule_id: tx.recurring_rule_id.clone(),
            })
            .collect();

        if include_recurring {
            let rules = self.recurring_repository.get_by_account_id(account_id)?;
            for leg in self.project_legs(&rules, from, to, Some(account_id))? {
                items.push(TimelineItem {
                    date: leg.effective_date,
                    description: leg.description,
                    amount: leg.amount,
                    is_projected: true,
                    transaction_id: None,
                    rule_id: Some(leg.rule_id),
                });
            }
        }

        items.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.is_projected.cmp(&b.is_projected))
                .then_with(|| a.description.cmp(&b.description))
        });

        // The current balance only ever reflects realized history up to the
        // reference date; projections stay informational.
        let settled = self.transaction_repository.get_by_date_range(
            NaiveDate::MIN,
            today,
            Some(account_id),
        )?;
        let current_balance = account.initial_balance
            + settled.iter().map(|tx| tx.amount).sum::<Decimal>();

        Ok(AccountTransactionList {
            account_id: account.id,
            account_name: account.name,
            currency: account.currency,
            current_balance,
            items,
        })
    }
}
