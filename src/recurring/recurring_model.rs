//! Recurring rule domain models.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::utils::time_utils::days_in_month;

/// Supported recurrence frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    #[default]
    Monthly,
}

/// Immutable recurrence rule value: every `interval` months on `day_of_month`.
///
/// When `day_of_month` exceeds the length of a generated month, that
/// occurrence clamps to the month's last day (anchor 31 in April yields
/// April 30). Invalid parameters are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    frequency: Frequency,
    interval: u32,
    day_of_month: u32,
}

impl RecurrencePattern {
    /// Creates a validated monthly recurrence pattern.
    pub fn new(frequency: Frequency, interval: u32, day_of_month: u32) -> Result<Self> {
        if interval < 1 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Recurrence interval must be at least 1 month".to_string(),
            )));
        }
        if !(1..=31).contains(&day_of_month) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Recurrence day of month must be between 1 and 31".to_string(),
            )));
        }
        Ok(Self {
            frequency,
            interval,
            day_of_month,
        })
    }

    /// Convenience constructor for the common every-month case.
    pub fn monthly(day_of_month: u32) -> Result<Self> {
        Self::new(Frequency::Monthly, 1, day_of_month)
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn day_of_month(&self) -> u32 {
        self.day_of_month
    }

    /// Expands the pattern into the dates falling inside both the rule's
    /// lifetime (`start_date..=end_date`) and the query window
    /// (`range_start..=range_end`).
    ///
    /// The returned iterator is lazy, finite, restartable (`Clone`), and
    /// yields strictly ascending dates. Months advance by `interval` from
    /// the start month; the day clamps to each month's length individually.
    pub fn occurrences_between(
        &self,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Occurrences {
        let lower = start_date.max(range_start);
        let upper = match end_date {
            Some(end) => end.min(range_end),
            None => range_end,
        };

        // Skip ahead close to the window instead of walking from the rule
        // start; the yield loop still filters dates below `lower`.
        let anchor_index = month_index(start_date);
        let months_ahead = month_index(lower) - anchor_index;
        let step = if months_ahead > 0 {
            (months_ahead as u64) / u64::from(self.interval)
        } else {
            0
        };

        Occurrences {
            pattern: *self,
            anchor_index,
            lower,
            upper,
            step,
            exhausted: lower > upper,
        }
    }
}

/// Zero-based absolute month index for date arithmetic.
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Lazy iterator over the occurrence dates of a [`RecurrencePattern`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    pattern: RecurrencePattern,
    anchor_index: i64,
    lower: NaiveDate,
    upper: NaiveDate,
    step: u64,
    exhausted: bool,
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.exhausted {
            let index = self.anchor_index
                + (self.step as i64).checked_mul(i64::from(self.pattern.interval))?;
            self.step += 1;

            let year = i32::try_from(index.div_euclid(12)).ok()?;
            let month = (index.rem_euclid(12) as u32) + 1;
            let day = self.pattern.day_of_month.min(days_in_month(year, month));

            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                self.exhausted = true;
                return None;
            };

            if date > self.upper {
                self.exhausted = true;
                return None;
            }
            if date < self.lower {
                continue;
            }
            return Some(date);
        }
        None
    }
}

/// A recurring single-account transaction rule.
///
/// `amount` is signed exactly like the ledger rows it realizes into:
/// negative for expenses, positive for income. Rules are never mutated in
/// amount or pattern after creation; single occurrences are adjusted through
/// [`RecurrenceException`] records instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransaction {
    pub id: String,
    pub account_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A recurring inter-account transfer rule.
///
/// `amount` is the positive transferred magnitude; realization writes a
/// debit (`-amount`) on the source account and a credit (`+amount`) on the
/// destination account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransfer {
    pub id: String,
    pub source_account_id: String,
    pub destination_account_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub pattern: RecurrencePattern,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Discriminator for the two recurring rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringRuleType {
    RecurringTransaction,
    RecurringTransfer,
}

/// Tagged union over the two recurring rule kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "ruleType", rename_all = "camelCase")]
pub enum RecurringRule {
    Transaction(RecurringTransaction),
    Transfer(RecurringTransfer),
}

impl RecurringRule {
    pub fn id(&self) -> &str {
        match self {
            RecurringRule::Transaction(rule) => &rule.id,
            RecurringRule::Transfer(rule) => &rule.id,
        }
    }

    pub fn rule_type(&self) -> RecurringRuleType {
        match self {
            RecurringRule::Transaction(_) => RecurringRuleType::RecurringTransaction,
            RecurringRule::Transfer(_) => RecurringRuleType::RecurringTransfer,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            RecurringRule::Transaction(rule) => &rule.description,
            RecurringRule::Transfer(rule) => &rule.description,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            RecurringRule::Transaction(rule) => rule.amount,
            RecurringRule::Transfer(rule) => rule.amount,
        }
    }

    pub fn currency(&self) -> &str {
        match self {
            RecurringRule::Transaction(rule) => &rule.currency,
            RecurringRule::Transfer(rule) => &rule.currency,
        }
    }

    pub fn pattern(&self) -> &RecurrencePattern {
        match self {
            RecurringRule::Transaction(rule) => &rule.pattern,
            RecurringRule::Transfer(rule) => &rule.pattern,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            RecurringRule::Transaction(rule) => rule.start_date,
            RecurringRule::Transfer(rule) => rule.start_date,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self {
            RecurringRule::Transaction(rule) => rule.end_date,
            RecurringRule::Transfer(rule) => rule.end_date,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            RecurringRule::Transaction(rule) => rule.is_active,
            RecurringRule::Transfer(rule) => rule.is_active,
        }
    }

    /// Whether the account participates in this rule (as the transaction
    /// account, or as either side of a transfer).
    pub fn involves_account(&self, account_id: &str) -> bool {
        match self {
            RecurringRule::Transaction(rule) => rule.account_id == account_id,
            RecurringRule::Transfer(rule) => {
                rule.source_account_id == account_id || rule.destination_account_id == account_id
            }
        }
    }

    /// Expands this rule's pattern inside its own lifetime bounds.
    pub fn occurrences_between(&self, range_start: NaiveDate, range_end: NaiveDate) -> Occurrences {
        self.pattern()
            .occurrences_between(self.start_date(), self.end_date(), range_start, range_end)
    }
}

/// A virtual calendar instance of a recurring rule. Never persisted; two
/// occurrences are equal iff rule id and date are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub rule_id: String,
    pub date: NaiveDate,
}

/// Exception kinds for a single occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionKind {
    Skipped,
    Modified,
}

/// Persisted per-occurrence overlay, keyed by `(rule_id, original_date)`.
///
/// The store enforces at most one exception per key. Override fields are
/// only meaningful for `Modified` exceptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceException {
    pub id: String,
    pub rule_id: String,
    pub original_date: NaiveDate,
    pub kind: ExceptionKind,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording a new occurrence exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurrenceException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub rule_id: String,
    pub original_date: NaiveDate,
    pub kind: ExceptionKind,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub effective_date: Option<NaiveDate>,
}

/// Caller-supplied field overrides for a realization request.
///
/// Request values take precedence over exception values, which take
/// precedence over the rule's own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizationOverrides {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

impl RealizationOverrides {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.amount.is_none() && self.description.is_none()
    }
}

/// Summary of a realized transfer occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRealization {
    pub source_transaction_id: String,
    pub destination_transaction_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// One due-but-unrealized occurrence in a past-due report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastDueItem {
    pub rule_id: String,
    pub rule_type: RecurringRuleType,
    pub instance_date: NaiveDate,
    pub days_past_due: i64,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub account_name: String,
    /// Destination side, for transfers only.
    pub destination_account_name: Option<String>,
}

/// Aggregated past-due scan result, recomputed on every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastDueReport {
    pub items: Vec<PastDueItem>,
    pub total_count: usize,
    pub oldest_date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
}
