use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::transactions_model::Transaction;

fn base_transaction() -> Transaction {
    Transaction {
        id: "tx-1".to_string(),
        account_id: "acc-1".to_string(),
        amount: dec!(-15.99),
        currency: "USD".to_string(),
        description: "Streaming subscription".to_string(),
        transaction_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        category_id: None,
        recurring_rule_id: None,
        recurring_instance_date: None,
        transfer_group_id: None,
        created_at: Default::default(),
        updated_at: Default::default(),
    }
}

#[test]
fn manual_transaction_has_no_instance_key() {
    let tx = base_transaction();
    assert!(!tx.is_recurring_instance());
    assert_eq!(tx.recurring_instance_key(), None);
}

#[test]
fn realized_transaction_exposes_original_instance_date() {
    let mut tx = base_transaction();
    tx.recurring_rule_id = Some("rule-1".to_string());
    tx.recurring_instance_date = NaiveDate::from_ymd_opt(2026, 1, 5);
    // Posted date may differ from the occurrence date; the key must not.
    tx.transaction_date = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();

    assert!(tx.is_recurring_instance());
    assert_eq!(
        tx.recurring_instance_key(),
        Some(("rule-1", NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()))
    );
}

#[test]
fn rule_id_without_date_is_not_an_instance() {
    let mut tx = base_transaction();
    tx.recurring_rule_id = Some("rule-1".to_string());
    assert!(!tx.is_recurring_instance());
    assert_eq!(tx.recurring_instance_key(), None);
}
