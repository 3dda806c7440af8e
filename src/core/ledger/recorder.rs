use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::errors::LedgerError;
use crate::core::models::{Expense, PaymentRecord};
use crate::infrastructure::storage::Storage;

/// Sets the paid flag of one allocation on `expense`.
///
/// Re-applying the current state succeeds with `changed == false`.
/// `is_settled` on the expense is kept in step with its allocations.
pub fn apply_payment(
    expense: &mut Expense,
    member_id: &str,
    paid: bool,
    at: DateTime<Utc>,
) -> Result<PaymentRecord, LedgerError> {
    let allocation = expense
        .allocations
        .iter_mut()
        .find(|a| a.member_id == member_id)
        .ok_or_else(|| LedgerError::AllocationNotFound {
            expense_id: expense.id.clone(),
            member_id: member_id.to_string(),
        })?;

    let changed = allocation.paid != paid;
    if changed {
        allocation.paid = paid;
        allocation.paid_at = paid.then_some(at);
    }
    expense.refresh_settled();

    Ok(PaymentRecord {
        expense_id: expense.id.clone(),
        member_id: member_id.to_string(),
        paid,
        changed,
        expense_settled: expense.is_settled,
    })
}

/// The only writer in the ledger. Each call is a single transition the store
/// applies atomically.
pub struct SettlementRecorder<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> SettlementRecorder<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        SettlementRecorder { storage }
    }

    pub async fn mark_paid(&self, expense_id: &str, member_id: &str) -> Result<PaymentRecord, LedgerError> {
        self.record(expense_id, member_id, true).await
    }

    pub async fn mark_unpaid(&self, expense_id: &str, member_id: &str) -> Result<PaymentRecord, LedgerError> {
        self.record(expense_id, member_id, false).await
    }

    async fn record(&self, expense_id: &str, member_id: &str, paid: bool) -> Result<PaymentRecord, LedgerError> {
        let record = self
            .storage
            .record_allocation_payment(expense_id, member_id, paid, Utc::now())
            .await?;
        debug!(
            "Allocation {}/{} paid={} changed={}",
            expense_id, member_id, record.paid, record.changed
        );
        Ok(record)
    }
}
