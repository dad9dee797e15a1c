//! Calendar module - grid, day detail, and account timeline views.

mod calendar_model;
mod calendar_service;
mod calendar_traits;


pub use calendar_model::{
    AccountTransactionList, CalendarDay, CalendarGrid, DayDetail, DayDetailItem, MonthSummary,
    TimelineItem,
};
pub use calendar_service::CalendarService;
pub use calendar_traits::CalendarServiceTrait;
