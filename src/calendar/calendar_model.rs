//! Calendar and account view models.
//!
//! These are derived reporting shapes, recomputed per query; nothing here is
//! persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cell of the 6x7 calendar grid.
///
/// `actual_*` aggregates realized transactions posted on the date;
/// `projected_*` aggregates not-yet-realized recurring occurrences landing
/// on it. A realized occurrence never appears on the projected side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub actual_amount: Decimal,
    pub actual_count: i64,
    pub projected_amount: Decimal,
    pub projected_count: i64,
}

/// Actual-money summary for the target month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    /// Sum of positive realized amounts.
    pub total_income: Decimal,
    /// Sum of negative realized amounts.
    pub total_expenses: Decimal,
    pub net_change: Decimal,
}

/// A full calendar month view: exactly 42 day cells covering the trailing
/// days of the previous month, the target month, and the leading days of the
/// next month, with weeks starting on Sunday.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub summary: MonthSummary,
}

/// One line of a day detail view - either a realized transaction or a
/// projected occurrence leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetailItem {
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub account_id: String,
    pub account_name: String,
    pub is_projected: bool,
    pub transaction_id: Option<String>,
    pub rule_id: Option<String>,
}

/// Merged realized + projected view of a single date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    pub date: NaiveDate,
    pub items: Vec<DayDetailItem>,
    pub total_actual: Decimal,
    pub total_projected: Decimal,
    pub total_combined: Decimal,
    pub item_count: usize,
}

/// One line of an account timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub is_projected: bool,
    pub transaction_id: Option<String>,
    pub rule_id: Option<String>,
}

/// Account timeline with the derived current balance.
///
/// `current_balance` is the account's initial balance plus every realized
/// transaction up to the reference date; projected items never move it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTransactionList {
    pub account_id: String,
    pub account_name: String,
    pub currency: String,
    pub current_balance: Decimal,
    pub items: Vec<TimelineItem>,
}
