use crate::core::errors::LedgerError;
use crate::core::ledger::apply_payment;
use crate::core::models::{Expense, Group, PaymentRecord, audit::GroupAudit};
use crate::infrastructure::storage::{ExpenseFilter, Storage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    groups: Arc<RwLock<HashMap<String, Group>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    group_audits: Arc<RwLock<HashMap<String, Vec<GroupAudit>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_group(&self, group: Group) -> Result<(), LedgerError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, LedgerError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn list_groups(&self, member_id: &str) -> Result<Vec<Group>, LedgerError> {
        let groups = self.groups.read().await;
        let mut listed: Vec<Group> = groups.values().filter(|g| g.is_member(member_id)).cloned().collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), LedgerError> {
        let mut expenses = self.expenses.write().await;
        expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, LedgerError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(expense_id).cloned())
    }

    async fn list_expenses(&self, group_id: &str, filter: ExpenseFilter) -> Result<Vec<Expense>, LedgerError> {
        let expenses = self.expenses.read().await;
        let mut listed: Vec<Expense> = expenses
            .values()
            .filter(|e| e.group_id == group_id && filter.matches(e))
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn record_allocation_payment(
        &self,
        expense_id: &str,
        member_id: &str,
        paid: bool,
        at: DateTime<Utc>,
    ) -> Result<PaymentRecord, LedgerError> {
        // Held for the whole transition so concurrent callers serialize.
        let mut expenses = self.expenses.write().await;
        let expense = expenses
            .get_mut(expense_id)
            .ok_or_else(|| LedgerError::AllocationNotFound {
                expense_id: expense_id.to_string(),
                member_id: member_id.to_string(),
            })?;
        apply_payment(expense, member_id, paid, at)
    }

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), LedgerError> {
        let mut audits = self.group_audits.write().await;
        audits.entry(audit.group_id.clone()).or_default().push(audit);
        Ok(())
    }

    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, LedgerError> {
        let audits = self.group_audits.read().await;
        Ok(audits.get(group_id).cloned().unwrap_or_default())
    }
}
