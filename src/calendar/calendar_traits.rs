//! Calendar service trait.

use chrono::NaiveDate;

use super::calendar_model::{AccountTransactionList, CalendarGrid, DayDetail};
use crate::errors::Result;

/// Trait defining the contract for calendar and account projection views.
pub trait CalendarServiceTrait: Send + Sync {
    /// Builds the 42-cell month grid, merging realized daily totals with
    /// projected recurring occurrences.
    fn get_calendar_grid(
        &self,
        year: i32,
        month: u32,
        account_id: Option<&str>,
    ) -> Result<CalendarGrid>;

    /// Merges realized transactions and projected occurrences landing on one
    /// date into a single ordered item list.
    fn get_day_detail(&self, date: NaiveDate, account_id: Option<&str>) -> Result<DayDetail>;

    /// Account timeline over a date range, optionally augmented with
    /// projected recurring occurrences, plus the current balance as of the
    /// injected reference date.
    fn get_account_transaction_list(
        &self,
        account_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        include_recurring: bool,
        today: NaiveDate,
    ) -> Result<AccountTransactionList>;
}
