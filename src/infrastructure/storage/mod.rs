use crate::core::errors::{FieldError, LedgerError};
use crate::core::models::{Expense, Group, PaymentRecord, audit::GroupAudit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpenseStatus {
    #[default]
    All,
    /// Expenses with at least one unpaid allocation owed to the payer.
    Unsettled,
    Settled,
}

/// Inclusive bounds on `Expense::created_at`. A missing bound is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self, LedgerError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(LedgerError::InvalidInput(
                    "end".to_string(),
                    FieldError {
                        field: "end".to_string(),
                        title: "Invalid date range".to_string(),
                        description: format!("end {} is before start {}", end, start),
                    },
                ));
            }
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub status: ExpenseStatus,
    pub range: DateRange,
}

impl ExpenseFilter {
    pub fn all() -> Self {
        ExpenseFilter::default()
    }

    pub fn unsettled() -> Self {
        ExpenseFilter {
            status: ExpenseStatus::Unsettled,
            ..Default::default()
        }
    }

    pub fn settled() -> Self {
        ExpenseFilter {
            status: ExpenseStatus::Settled,
            ..Default::default()
        }
    }

    pub fn within(self, range: DateRange) -> Self {
        ExpenseFilter { range, ..self }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        let status = match self.status {
            ExpenseStatus::All => true,
            ExpenseStatus::Unsettled => !expense.is_settled,
            ExpenseStatus::Settled => expense.is_settled,
        };
        status && self.range.contains(expense.created_at)
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_group(&self, group: Group) -> Result<(), LedgerError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, LedgerError>;
    /// Groups `member_id` currently belongs to, oldest first.
    async fn list_groups(&self, member_id: &str) -> Result<Vec<Group>, LedgerError>;
    async fn save_expense(&self, expense: Expense) -> Result<(), LedgerError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, LedgerError>;
    /// Expenses of one group, oldest first.
    async fn list_expenses(&self, group_id: &str, filter: ExpenseFilter) -> Result<Vec<Expense>, LedgerError>;
    /// Atomically sets the paid flag of one (expense, member) allocation.
    async fn record_allocation_payment(
        &self,
        expense_id: &str,
        member_id: &str,
        paid: bool,
        at: DateTime<Utc>,
    ) -> Result<PaymentRecord, LedgerError>;
    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), LedgerError>;
    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, LedgerError>;
}

pub mod in_memory;
