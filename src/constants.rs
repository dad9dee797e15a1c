/// Lookback window for past-due detection, in days
pub const PAST_DUE_LOOKBACK_DAYS: i64 = 30;

/// Number of week rows in a calendar grid
pub const CALENDAR_WEEKS: u32 = 6;

/// Number of day cells in a calendar grid (6 weeks x 7 days)
pub const CALENDAR_GRID_SIZE: usize = 42;

/// Padding applied to occurrence expansion windows so date-modified
/// exceptions (at most one month of drift per pattern step) stay visible
pub const OCCURRENCE_WINDOW_PADDING_DAYS: i64 = 31;

/// Placeholder used when an account name cannot be resolved
pub const UNRESOLVED_ACCOUNT_NAME: &str = "Unknown account";
