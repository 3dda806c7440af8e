use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{GroupId, MemberBalance};
use crate::core::errors::LedgerWarning;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub expense_count: usize,
    pub total_expenses: i64,
    pub unsettled_expense_count: usize,
    pub unsettled_amount: i64,
    pub balances: Vec<MemberBalance>,
    pub warnings: Vec<LedgerWarning>,
}
