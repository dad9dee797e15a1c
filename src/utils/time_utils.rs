use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Default timezone for business dates.
/// This is the canonical timezone used to convert UTC instants to domain dates.
pub const DEFAULT_BUSINESS_TZ: Tz = chrono_tz::America::New_York;

/// Converts a UTC instant to a business date in the given timezone.
///
/// This is the single source of truth for converting instants to domain dates.
/// Use this whenever you need to derive a "business date" from a timestamp.
///
/// # Arguments
/// * `instant` - The UTC timestamp to convert
/// * `tz` - The timezone to use for the conversion
pub fn business_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Convenience function that uses the default business timezone.
///
/// Services never call this internally; the reference "today" is always an
/// injected parameter so past-due detection and projections stay
/// deterministic. Callers use this at the edge to supply wall-clock time.
pub fn business_date_today() -> NaiveDate {
    business_date_from_utc(Utc::now(), DEFAULT_BUSINESS_TZ)
}

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            // Should not happen for typical date ranges
            break;
        }
    }
    days
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 1), 31);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_get_days_between_inclusive() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let days = get_days_between(start, end);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], start);
        assert_eq!(days[3], end);
    }

    #[test]
    fn test_get_days_between_inverted_range_is_empty() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        assert!(get_days_between(start, end).is_empty());
    }
}
