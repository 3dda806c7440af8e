use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ExpenseId, GroupId, MemberId};
use crate::core::errors::LedgerWarning;

/// A proposed payment of `amount` from `from` to `to`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SettlementInstruction {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SettlementPlan {
    pub group_id: GroupId,
    pub instructions: Vec<SettlementInstruction>,
    pub warnings: Vec<LedgerWarning>,
}

/// Outcome of marking one allocation paid or unpaid.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PaymentRecord {
    pub expense_id: ExpenseId,
    pub member_id: MemberId,
    pub paid: bool,
    /// False when the allocation was already in the requested state.
    pub changed: bool,
    pub expense_settled: bool,
}
