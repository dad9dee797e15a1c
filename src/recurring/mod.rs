//! Recurring module - recurrence rules, occurrence expansion, exception
//! overlays, realization, and past-due detection.

mod overlay;
mod past_due_service;
mod realization_service;
mod recurring_errors;
mod recurring_model;
mod recurring_service;
mod recurring_traits;


#[cfg(test)]
mod realization_service_tests;



pub use overlay::{resolve_occurrence, EffectiveOccurrence, OccurrenceResolution};
pub use past_due_service::PastDueService;
pub use realization_service::RealizationService;
pub use recurring_errors::RecurringError;
pub use recurring_model::{
    ExceptionKind, Frequency, NewRecurrenceException, Occurrence, Occurrences, PastDueItem,
    PastDueReport, RealizationOverrides, RecurrenceException, RecurrencePattern, RecurringRule,
    RecurringRuleType, RecurringTransaction, RecurringTransfer, TransferRealization,
};
pub use recurring_service::RecurringService;
pub use recurring_traits::{
    PastDueServiceTrait, RealizationServiceTrait, RecurringRepositoryTrait, RecurringServiceTrait,
};
