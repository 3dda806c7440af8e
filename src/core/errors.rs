use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::models::{ExpenseId, MemberId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum LedgerError {
    /// Allocation amounts do not add up to the expense total
    #[error("Allocations sum to {actual} but expense amount is {expected}")]
    AllocationMismatch { expected: i64, actual: i64 },

    /// Split names no members
    #[error("Split must name at least one member")]
    EmptySplit,

    #[error("Invalid percentage split: {0}")]
    InvalidPercentage(String),

    /// A member appears more than once in the split input
    #[error("Member {0} appears more than once in split")]
    DuplicateMember(MemberId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    #[error("Share weights must sum to more than zero")]
    InvalidShares,

    #[error("Allocation for member {member_id} on expense {expense_id} not found")]
    AllocationNotFound { expense_id: ExpenseId, member_id: MemberId },

    #[error("Expense {0} not found")]
    ExpenseNotFound(ExpenseId),

    #[error("Group {0} not found")]
    GroupNotFound(String),

    /// The acting member is not in the group
    #[error("Member {0} is not a group member")]
    NotGroupMember(MemberId),

    /// The member an operation targets is not in the group
    #[error("Member {0} not found in group")]
    MemberNotFound(MemberId),

    /// Payer or split participant named in an expense is not in the group
    #[error("Member {0} cannot take part in an expense of this group")]
    InvalidSplitMember(MemberId),

    #[error("Member {0} is already a group member")]
    AlreadyGroupMember(MemberId),

    /// Acting member's role does not allow the operation
    #[error("Member {0} does not have the required role")]
    InsufficientRole(MemberId),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Group owner cannot be removed")]
    OwnerCannotBeRemoved,

    #[error("Invalid owner count: {0}")]
    InvalidOwnerCount(usize),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),
}

/// Non-fatal consistency findings returned next to a still-valid result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerWarning {
    /// The payer is no longer a group member, so the expense is left out of
    /// settlement.
    OrphanedExpense { expense_id: ExpenseId, payer_id: MemberId },
}

impl std::fmt::Display for LedgerWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerWarning::OrphanedExpense { expense_id, payer_id } => write!(
                f,
                "Expense {} was paid by {} who is no longer a group member",
                expense_id, payer_id
            ),
        }
    }
}
