use crate::core::errors::LedgerError;
use crate::core::ledger::{SettlementRecorder, apply_payment};
use crate::infrastructure::storage::{ExpenseFilter, Storage, in_memory::InMemoryStorage};
use crate::tests::expense;
use chrono::{Duration, Utc};

#[test]
fn test_apply_payment_sets_flag_and_timestamp() {
    let mut e = expense("e1", "g1", "a", &[("a", 50), ("b", 50)]);
    let at = Utc::now();

    let record = apply_payment(&mut e, "b", true, at).unwrap();
    assert!(record.paid);
    assert!(record.changed);
    assert!(record.expense_settled);
    assert_eq!(e.allocation("b").unwrap().paid_at, Some(at));
    assert!(e.is_settled);
}

#[test]
fn test_apply_payment_is_idempotent() {
    let mut e = expense("e1", "g1", "a", &[("b", 50), ("c", 50)]);
    let first = Utc::now();
    apply_payment(&mut e, "b", true, first).unwrap();

    let again = apply_payment(&mut e, "b", true, first + Duration::seconds(60)).unwrap();
    assert!(!again.changed);
    assert!(again.paid);
    assert_eq!(e.allocation("b").unwrap().paid_at, Some(first));
    assert!(!e.is_settled);
}

#[test]
fn test_apply_payment_unpaid_clears_timestamp() {
    let mut e = expense("e1", "g1", "a", &[("b", 50)]);
    apply_payment(&mut e, "b", true, Utc::now()).unwrap();
    assert!(e.is_settled);

    let record = apply_payment(&mut e, "b", false, Utc::now()).unwrap();
    assert!(record.changed);
    assert!(!record.expense_settled);
    assert_eq!(e.allocation("b").unwrap().paid_at, None);

    let noop = apply_payment(&mut e, "b", false, Utc::now()).unwrap();
    assert!(!noop.changed);
}

#[test]
fn test_apply_payment_unknown_member() {
    let mut e = expense("e1", "g1", "a", &[("b", 50)]);
    assert_eq!(
        apply_payment(&mut e, "zed", true, Utc::now()),
        Err(LedgerError::AllocationNotFound {
            expense_id: "e1".to_string(),
            member_id: "zed".to_string()
        })
    );
}

#[test]
fn test_payer_allocation_does_not_block_settlement() {
    let mut e = expense("e1", "g1", "a", &[("a", 10), ("b", 10), ("c", 10)]);
    apply_payment(&mut e, "b", true, Utc::now()).unwrap();
    assert!(!e.is_settled);
    apply_payment(&mut e, "c", true, Utc::now()).unwrap();
    assert!(e.is_settled);
    assert!(!e.allocation("a").unwrap().paid);
}

#[tokio::test]
async fn test_recorder_persists_through_storage() {
    let storage = InMemoryStorage::new();
    storage
        .save_expense(expense("e1", "g1", "a", &[("b", 40), ("c", 60)]))
        .await
        .unwrap();
    let recorder = SettlementRecorder::new(&storage);

    let record = recorder.mark_paid("e1", "b").await.unwrap();
    assert!(record.changed);
    let stored = storage.get_expense("e1").await.unwrap().unwrap();
    assert!(stored.allocation("b").unwrap().paid);
    assert!(stored.allocation("b").unwrap().paid_at.is_some());

    recorder.mark_paid("e1", "c").await.unwrap();
    let settled = storage.list_expenses("g1", ExpenseFilter::settled()).await.unwrap();
    assert_eq!(settled.len(), 1);

    recorder.mark_unpaid("e1", "b").await.unwrap();
    let unsettled = storage.list_expenses("g1", ExpenseFilter::unsettled()).await.unwrap();
    assert_eq!(unsettled.len(), 1);
}

#[tokio::test]
async fn test_recorder_missing_expense() {
    let storage = InMemoryStorage::new();
    let recorder = SettlementRecorder::new(&storage);
    assert_eq!(
        recorder.mark_paid("nope", "b").await,
        Err(LedgerError::AllocationNotFound {
            expense_id: "nope".to_string(),
            member_id: "b".to_string()
        })
    );
}

#[tokio::test]
async fn test_concurrent_mark_paid_changes_once() {
    let storage = InMemoryStorage::new();
    storage
        .save_expense(expense("e1", "g1", "a", &[("b", 40)]))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let storage = storage.clone();
            tokio::spawn(async move { SettlementRecorder::new(&storage).mark_paid("e1", "b").await })
        })
        .collect();

    let mut changed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().changed {
            changed += 1;
        }
    }
    assert_eq!(changed, 1);
}
