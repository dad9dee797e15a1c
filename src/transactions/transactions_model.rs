//! Ledger transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain model representing a permanent ledger transaction.
///
/// Expenses carry negative amounts, income positive. Rows realized from a
/// recurring rule carry the rule id and the ORIGINAL occurrence date in
/// `recurring_rule_id` / `recurring_instance_date`; together they form the
/// idempotency key for that occurrence and stay stable even when the posted
/// `transaction_date` was overridden. The two legs of a transfer share a
/// `transfer_group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub category_id: Option<String>,
    pub recurring_rule_id: Option<String>,
    pub recurring_instance_date: Option<NaiveDate>,
    pub transfer_group_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Whether this row was realized from a recurring rule.
    pub fn is_recurring_instance(&self) -> bool {
        self.recurring_rule_id.is_some() && self.recurring_instance_date.is_some()
    }

    /// The `(rule_id, original_date)` idempotency key, when present.
    pub fn recurring_instance_key(&self) -> Option<(&str, NaiveDate)> {
        match (&self.recurring_rule_id, self.recurring_instance_date) {
            (Some(rule_id), Some(date)) => Some((rule_id.as_str(), date)),
            _ => None,
        }
    }
}

/// Input model for staging a new ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub account_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub category_id: Option<String>,
    pub recurring_rule_id: Option<String>,
    pub recurring_instance_date: Option<NaiveDate>,
    pub transfer_group_id: Option<String>,
}

/// Per-day aggregate of realized transactions, as supplied by the store
/// for calendar rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub count: i64,
}
