//! Per-occurrence overlay resolution.
//!
//! Decides the fate of a single occurrence from the stored exception record
//! and an optional realization request. The computation is pure: any caller
//! holding the same rule defaults, exception, and request resolves to the
//! same outcome.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::recurring_model::{ExceptionKind, RealizationOverrides, RecurrenceException};

/// Fully-resolved effective values for one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOccurrence {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
}

/// Outcome of resolving one occurrence against its overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceResolution {
    /// Excluded from projections and past-due listings; realization refused.
    Skipped,
    /// At least one field was overridden by the exception or the request.
    Modified(EffectiveOccurrence),
    /// Rule defaults apply verbatim.
    Unmodified(EffectiveOccurrence),
}

impl OccurrenceResolution {
    pub fn is_skipped(&self) -> bool {
        matches!(self, OccurrenceResolution::Skipped)
    }

    /// The effective values, unless the occurrence is skipped.
    pub fn effective(&self) -> Option<&EffectiveOccurrence> {
        match self {
            OccurrenceResolution::Skipped => None,
            OccurrenceResolution::Modified(effective)
            | OccurrenceResolution::Unmodified(effective) => Some(effective),
        }
    }

    pub fn into_effective(self) -> Option<EffectiveOccurrence> {
        match self {
            OccurrenceResolution::Skipped => None,
            OccurrenceResolution::Modified(effective)
            | OccurrenceResolution::Unmodified(effective) => Some(effective),
        }
    }
}

/// Resolves one occurrence to its fate.
///
/// Field precedence is request > exception > rule default, per field. A
/// `Skipped` exception wins outright - even an explicit request cannot
/// realize a skipped occurrence without deleting the exception first.
pub fn resolve_occurrence(
    occurrence_date: NaiveDate,
    default_amount: Decimal,
    default_description: &str,
    exception: Option<&RecurrenceException>,
    overrides: Option<&RealizationOverrides>,
) -> OccurrenceResolution {
    if exception.is_some_and(|e| e.kind == ExceptionKind::Skipped) {
        return OccurrenceResolution::Skipped;
    }

    let modification = exception.filter(|e| e.kind == ExceptionKind::Modified);

    let date = overrides
        .and_then(|o| o.date)
        .or_else(|| modification.and_then(|e| e.effective_date))
        .unwrap_or(occurrence_date);
    let amount = overrides
        .and_then(|o| o.amount)
        .or_else(|| modification.and_then(|e| e.amount))
        .unwrap_or(default_amount);
    let description = overrides
        .and_then(|o| o.description.clone())
        .or_else(|| modification.and_then(|e| e.description.clone()))
        .unwrap_or_else(|| default_description.to_string());

    let effective = EffectiveOccurrence {
        date,
        amount,
        description,
    };

    if modification.is_some() || overrides.is_some_and(|o| !o.is_empty()) {
        OccurrenceResolution::Modified(effective)
    } else {
        OccurrenceResolution::Unmodified(effective)
    }
}
