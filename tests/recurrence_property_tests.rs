//! Property-based tests for recurrence expansion.
//!
//! These tests verify that universal properties hold across all valid
//! patterns and query windows, using the `proptest` crate for random test
//! case generation.

use chrono::{Datelike, Duration, NaiveDate};
use moneta_core::recurring::{Frequency, RecurrencePattern};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// Generates a valid recurrence pattern (interval 1-12, day 1-31).
fn arb_pattern() -> impl Strategy<Value = RecurrencePattern> {
    (1u32..=12, 1u32..=31).prop_map(|(interval, day_of_month)| {
        RecurrencePattern::new(Frequency::Monthly, interval, day_of_month)
            .expect("generated parameters are valid")
    })
}

/// Generates an arbitrary date between 2000 and 2040.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=12, 1u32..=28)
        .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
}

/// Generates a rule start, optional end, and a query window near the start.
fn arb_expansion_case() -> impl Strategy<
    Value = (
        RecurrencePattern,
        NaiveDate,
        Option<NaiveDate>,
        NaiveDate,
        NaiveDate,
    ),
> {
    (
        arb_pattern(),
        arb_date(),
        proptest::option::of(0i64..2000),
        -400i64..400,
        0i64..1200,
    )
        .prop_map(|(pattern, start, end_offset, window_offset, window_len)| {
            let end = end_offset.map(|days| start + Duration::days(days));
            let range_start = start + Duration::days(window_offset);
            let range_end = range_start + Duration::days(window_len);
            (pattern, start, end, range_start, range_end)
        })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every yielded date lies inside both the rule lifetime and the query
    /// window, and the sequence is strictly ascending.
    #[test]
    fn expansion_is_ascending_and_bounded(
        (pattern, start, end, range_start, range_end) in arb_expansion_case()
    ) {
        let dates: Vec<NaiveDate> = pattern
            .occurrences_between(start, end, range_start, range_end)
            .collect();

        for window in dates.windows(2) {
            prop_assert!(window[0] < window[1]);
        }
        for date in &dates {
            prop_assert!(*date >= start.max(range_start));
            prop_assert!(*date <= range_end);
            if let Some(end) = end {
                prop_assert!(*date <= end);
            }
        }
    }

    /// Each generated month contains exactly one occurrence, on the anchor
    /// day or on the month's last day when the anchor overflows - never
    /// rolled into the next month, never duplicated, never dropped.
    #[test]
    fn clamping_never_rolls_or_duplicates(
        pattern in arb_pattern(),
        start in arb_date(),
    ) {
        let range_end = start + Duration::days(800);
        let dates: Vec<NaiveDate> = pattern
            .occurrences_between(start, None, start, range_end)
            .collect();

        let mut seen_months = std::collections::HashSet::new();
        for date in &dates {
            prop_assert!(seen_months.insert((date.year(), date.month())));

            let last_day = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .unwrap()
                .checked_add_months(chrono::Months::new(1))
                .unwrap()
                .pred_opt()
                .unwrap()
                .day();
            let expected_day = pattern.day_of_month().min(last_day);
            prop_assert_eq!(date.day(), expected_day);
        }
    }

    /// The iterator is restartable: a clone replays the identical sequence.
    #[test]
    fn expansion_is_restartable(
        (pattern, start, end, range_start, range_end) in arb_expansion_case()
    ) {
        let occurrences = pattern.occurrences_between(start, end, range_start, range_end);
        let first: Vec<NaiveDate> = occurrences.clone().collect();
        let second: Vec<NaiveDate> = occurrences.collect();
        prop_assert_eq!(first, second);
    }

    /// Splitting a window into two halves loses and invents nothing.
    #[test]
    fn expansion_composes_over_window_splits(
        pattern in arb_pattern(),
        start in arb_date(),
    ) {
        let mid = start + Duration::days(400);
        let end = start + Duration::days(800);

        let whole: Vec<NaiveDate> = pattern
            .occurrences_between(start, None, start, end)
            .collect();
        let mut split: Vec<NaiveDate> = pattern
            .occurrences_between(start, None, start, mid)
            .collect();
        split.extend(pattern.occurrences_between(
            start,
            None,
            mid + Duration::days(1),
            end,
        ));

        prop_assert_eq!(whole, split);
    }
}
