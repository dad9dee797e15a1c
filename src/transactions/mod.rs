//! Transactions module - realized ledger rows, models, and traits.

mod transactions_model;
mod transactions_traits;

#[cfg(test)]
mod transactions_model_tests;

pub use transactions_model::{DailyTotal, NewTransaction, Transaction};
pub use transactions_traits::TransactionRepositoryTrait;
