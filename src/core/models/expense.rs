use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ExpenseId, GroupId, MemberId};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    Equal,
    Percentage,
    Custom,
    Shares,
}

/// One member's share of an expense, in minor currency units.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Allocation {
    pub member_id: MemberId,
    pub amount: i64,
    pub paid: bool,
    #[schema(value_type = Option<String>, example = "2024-06-01T12:34:56Z")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Allocation {
    pub fn new(member_id: impl Into<MemberId>, amount: i64) -> Self {
        Allocation {
            member_id: member_id.into(),
            amount,
            paid: false,
            paid_at: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub payer_id: MemberId,
    pub description: String,
    pub amount: i64,
    pub split_kind: SplitKind,
    pub allocations: Vec<Allocation>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    pub is_settled: bool,
}

impl Expense {
    pub fn allocation(&self, member_id: &str) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.member_id == member_id)
    }

    /// Unpaid amount still owed to the payer by other members.
    pub fn outstanding_amount(&self) -> i64 {
        self.allocations
            .iter()
            .filter(|a| a.member_id != self.payer_id && !a.paid)
            .map(|a| a.amount)
            .sum()
    }

    pub fn refresh_settled(&mut self) {
        self.is_settled = self
            .allocations
            .iter()
            .all(|a| a.paid || a.member_id == self.payer_id);
    }
}
