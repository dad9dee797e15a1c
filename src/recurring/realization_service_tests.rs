use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::recurring_model::{
    ExceptionKind, NewRecurrenceException, RealizationOverrides, RecurrenceException,
    RecurringRule, RecurringTransaction, RecurringTransfer, RecurrencePattern,
};
use super::recurring_traits::{RealizationServiceTrait, RecurringRepositoryTrait};
use super::{RealizationService, RecurringError};
use crate::db::UnitOfWorkTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::transactions::{
    DailyTotal, NewTransaction, Transaction, TransactionRepositoryTrait,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// --- Mock ledger: staged writes become visible only on save_changes ---

#[derive(Default)]
struct MockLedger {
    staged: Mutex<Vec<Transaction>>,
    committed: Mutex<Vec<Transaction>>,
    commits: AtomicUsize,
    fail_commit_with_unique_violation: AtomicBool,
}

impl MockLedger {
    fn committed_rows(&self) -> Vec<Transaction> {
        self.committed.lock().unwrap().clone()
    }

    fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionRepositoryTrait for MockLedger {
    fn get_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        account_id: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .committed
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| tx.transaction_date >= from && tx.transaction_date <= to)
            .filter(|tx| account_id.map_or(true, |id| tx.account_id == id))
            .cloned()
            .collect())
    }

    fn get_daily_totals(&self, _: i32, _: u32, _: Option<&str>) -> Result<Vec<DailyTotal>> {
        unimplemented!()
    }

    fn get_by_recurring_instance(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
    ) -> Result<Option<Transaction>> {
        Ok(self
            .committed
            .lock()
            .unwrap()
            .iter()
            .find(|tx| {
                tx.transfer_group_id.is_none()
                    && tx.recurring_instance_key() == Some((rule_id, instance_date))
            })
            .cloned())
    }

    fn get_by_recurring_transfer_instance(
        &self,
        rule_id: &str,
        instance_date: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .committed
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| {
                tx.transfer_group_id.is_some()
                    && tx.recurring_instance_key() == Some((rule_id, instance_date))
            })
            .cloned()
            .collect())
    }

    async fn add(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let transaction = Transaction {
            id: new_transaction
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            account_id: new_transaction.account_id,
            amount: new_transaction.amount,
            currency: new_transaction.currency,
            description: new_transaction.description,
            transaction_date: new_transaction.transaction_date,
            category_id: new_transaction.category_id,
            recurring_rule_id: new_transaction.recurring_rule_id,
            recurring_instance_date: new_transaction.recurring_instance_date,
            transfer_group_id: new_transaction.transfer_group_id,
            created_at: Default::default(),
            updated_at: Default::default(),
        };
        self.staged.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }
}

#[async_trait]
impl UnitOfWorkTrait for MockLedger {
    async fn save_changes(&self) -> Result<usize> {
        let mut staged = self.staged.lock().unwrap();
        if self
            .fail_commit_with_unique_violation
            .swap(false, Ordering::SeqCst)
        {
            // Rollback: staged rows are discarded, nothing persists.
            staged.clear();
            return Err(Error::Database(DatabaseError::UniqueViolation(
                "recurring_rule_id, recurring_instance_date".to_string(),
            )));
        }
        let count = staged.len();
        self.committed.lock().unwrap().append(&mut staged);
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(count)
    }
}

// --- Mock recurring rule store ---

#[derive(Default)]
struct MockRecurringRepository {
    transactions: Vec<RecurringTransaction>,
    transfers: Vec<RecurringTransfer>,
    exceptions: Vec<RecurrenceException>,
}

#[async_trait]
impl RecurringRepositoryTrait for MockRecurringRepository {
    fn get_active(&self) -> Result<Vec<RecurringRule>> {
        unimplemented!()
    }

    fn get_by_account_id(&self, _: &str) -> Result<Vec<RecurringRule>> {
        unimplemented!()
    }

    fn get_transaction_by_id(&self, rule_id: &str) -> Result<Option<RecurringTransaction>> {
        Ok(self
            .transactions
            .iter()
            .find(|rule| rule.id == rule_id)
            .cloned())
    }

    fn get_transfer_by_id(&self, rule_id: &str) -> Result<Option<RecurringTransfer>> {
        Ok(self
            .transfers
            .iter()
            .find(|rule| rule.id == rule_id)
            .cloned())
    }

    fn get_exception(
        &self,
        rule_id: &str,
        original_date: NaiveDate,
    ) -> Result<Option<RecurrenceException>> {
        Ok(self
            .exceptions
            .iter()
            .find(|e| e.rule_id == rule_id && e.original_date == original_date)
            .cloned())
    }

    fn get_exceptions_in_range(
        &self,
        rule_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RecurrenceException>> {
        Ok(self
            .exceptions
            .iter()
            .filter(|e| e.rule_id == rule_id && e.original_date >= from && e.original_date <= to)
            .cloned()
            .collect())
    }

    async fn add_exception(&self, _: NewRecurrenceException) -> Result<RecurrenceException> {
        unimplemented!()
    }
}

// --- Fixtures ---

fn streaming_rule() -> RecurringTransaction {
    RecurringTransaction {
        id: "rule-streaming".to_string(),
        account_id: "checking".to_string(),
        amount: dec!(-15.99),
        currency: "USD".to_string(),
        description: "Streaming subscription".to_string(),
        pattern: RecurrencePattern::monthly(5).unwrap(),
        start_date: date(2026, 1, 5),
        end_date: None,
        is_active: true,
        created_at: Default::default(),
        updated_at: Default::default(),
    }
}

fn savings_transfer() -> RecurringTransfer {
    RecurringTransfer {
        id: "rule-savings".to_string(),
        source_account_id: "checking".to_string(),
        destination_account_id: "savings".to_string(),
        amount: dec!(200),
        currency: "USD".to_string(),
        description: "Monthly savings".to_string(),
        pattern: RecurrencePattern::monthly(1).unwrap(),
        start_date: date(2026, 1, 1),
        end_date: None,
        is_active: true,
        created_at: Default::default(),
        updated_at: Default::default(),
    }
}

fn skip_exception(rule_id: &str, original_date: NaiveDate) -> RecurrenceException {
    RecurrenceException {
        id: "ex-skip".to_string(),
        rule_id: rule_id.to_string(),
        original_date,
        kind: ExceptionKind::Skipped,
        amount: None,
        description: None,
        effective_date: None,
        created_at: Default::default(),
        updated_at: Default::default(),
    }
}

fn make_service(repository: MockRecurringRepository) -> (RealizationService, Arc<MockLedger>) {
    let ledger = Arc::new(MockLedger::default());
    let service = RealizationService::new(
        Arc::new(repository),
        ledger.clone(),
        ledger.clone(),
    );
    (service, ledger)
}

// --- Tests ---

#[tokio::test]
async fn realize_transaction_persists_row_with_linkage() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        ..Default::default()
    });

    let transaction = service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap();

    assert_eq!(transaction.account_id, "checking");
    assert_eq!(transaction.amount, dec!(-15.99));
    assert_eq!(transaction.transaction_date, date(2026, 1, 5));
    assert_eq!(transaction.recurring_rule_id.as_deref(), Some("rule-streaming"));
    assert_eq!(transaction.recurring_instance_date, Some(date(2026, 1, 5)));

    let committed = ledger.committed_rows();
    assert_eq!(committed.len(), 1);
    assert_eq!(ledger.commit_count(), 1);
}

#[tokio::test]
async fn realize_transaction_twice_fails_without_duplicate() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        ..Default::default()
    });

    service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap();
    let err = service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Recurring(RecurringError::AlreadyRealized)
    ));
    assert_eq!(err.to_string(), "This instance has already been realized.");
    assert_eq!(ledger.committed_rows().len(), 1);
}

#[tokio::test]
async fn realize_unknown_transaction_rule_fails_not_found() {
    let (service, ledger) = make_service(MockRecurringRepository::default());

    let err = service
        .realize_transaction("missing", date(2026, 1, 5), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.to_string(), "Recurring transaction not found.");
    assert!(ledger.committed_rows().is_empty());
}

#[tokio::test]
async fn realize_skipped_occurrence_is_refused() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        exceptions: vec![skip_exception("rule-streaming", date(2026, 1, 5))],
        ..Default::default()
    });

    let err = service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Recurring(RecurringError::InstanceSkipped)
    ));
    assert!(ledger.committed_rows().is_empty());
    assert_eq!(ledger.commit_count(), 0);
}

#[tokio::test]
async fn request_overrides_beat_exception_values() {
    let exception = RecurrenceException {
        kind: ExceptionKind::Modified,
        amount: Some(dec!(-18.50)),
        description: Some("Streaming (promo)".to_string()),
        ..skip_exception("rule-streaming", date(2026, 1, 5))
    };
    let (service, _ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        exceptions: vec![exception],
        ..Default::default()
    });

    let transaction = service
        .realize_transaction(
            "rule-streaming",
            date(2026, 1, 5),
            Some(RealizationOverrides {
                amount: Some(dec!(-9.99)),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    // Request wins on amount; exception still supplies the description.
    assert_eq!(transaction.amount, dec!(-9.99));
    assert_eq!(transaction.description, "Streaming (promo)");
}

#[tokio::test]
async fn date_override_keeps_original_instance_date_as_idempotency_key() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        ..Default::default()
    });

    let transaction = service
        .realize_transaction(
            "rule-streaming",
            date(2026, 1, 5),
            Some(RealizationOverrides {
                date: Some(date(2026, 1, 8)),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

    assert_eq!(transaction.transaction_date, date(2026, 1, 8));
    assert_eq!(transaction.recurring_instance_date, Some(date(2026, 1, 5)));

    // The shifted posting date must not open the door to a second
    // realization of the same occurrence.
    let err = service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Recurring(RecurringError::AlreadyRealized)
    ));
    assert_eq!(ledger.committed_rows().len(), 1);
}

#[tokio::test]
async fn commit_time_unique_violation_maps_to_already_realized() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        ..Default::default()
    });
    ledger
        .fail_commit_with_unique_violation
        .store(true, Ordering::SeqCst);

    let err = service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Recurring(RecurringError::AlreadyRealized)
    ));
    assert!(ledger.committed_rows().is_empty());
}

#[tokio::test]
async fn realize_transfer_creates_two_linked_legs_in_one_commit() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transfers: vec![savings_transfer()],
        ..Default::default()
    });

    let realization = service
        .realize_transfer("rule-savings", date(2026, 2, 1), None)
        .await
        .unwrap();

    assert_eq!(realization.amount, dec!(200));
    assert_eq!(realization.date, date(2026, 2, 1));

    let committed = ledger.committed_rows();
    assert_eq!(committed.len(), 2);
    assert_eq!(ledger.commit_count(), 1);

    let source = committed
        .iter()
        .find(|tx| tx.id == realization.source_transaction_id)
        .unwrap();
    let destination = committed
        .iter()
        .find(|tx| tx.id == realization.destination_transaction_id)
        .unwrap();

    assert_eq!(source.account_id, "checking");
    assert_eq!(source.amount, dec!(-200));
    assert_eq!(destination.account_id, "savings");
    assert_eq!(destination.amount, dec!(200));
    assert_eq!(source.transfer_group_id, destination.transfer_group_id);
    assert!(source.transfer_group_id.is_some());
    assert_eq!(source.recurring_instance_date, Some(date(2026, 2, 1)));
    assert_eq!(destination.recurring_instance_date, Some(date(2026, 2, 1)));
}

#[tokio::test]
async fn realize_transfer_retry_fails_without_third_leg() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transfers: vec![savings_transfer()],
        ..Default::default()
    });

    service
        .realize_transfer("rule-savings", date(2026, 2, 1), None)
        .await
        .unwrap();
    let err = service
        .realize_transfer("rule-savings", date(2026, 2, 1), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Recurring(RecurringError::AlreadyRealized)
    ));
    assert_eq!(ledger.committed_rows().len(), 2);
}

#[tokio::test]
async fn realize_unknown_transfer_rule_fails_not_found() {
    let (service, _ledger) = make_service(MockRecurringRepository::default());

    let err = service
        .realize_transfer("missing", date(2026, 2, 1), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Recurring transfer not found.");
}

#[tokio::test]
async fn distinct_occurrences_of_same_rule_realize_independently() {
    let (service, ledger) = make_service(MockRecurringRepository {
        transactions: vec![streaming_rule()],
        ..Default::default()
    });

    service
        .realize_transaction("rule-streaming", date(2026, 1, 5), None)
        .await
        .unwrap();
    service
        .realize_transaction("rule-streaming", date(2026, 2, 5), None)
        .await
        .unwrap();

    assert_eq!(ledger.committed_rows().len(), 2);
}
