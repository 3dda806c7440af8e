use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{GroupId, MemberId};
use crate::core::errors::LedgerWarning;

/// A member's net position within a group. Positive means the member is owed
/// money, negative means they owe.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub total_paid: i64,
    pub total_owed: i64,
    pub balance: i64,
}

impl MemberBalance {
    pub fn new(member_id: impl Into<MemberId>) -> Self {
        MemberBalance {
            member_id: member_id.into(),
            total_paid: 0,
            total_owed: 0,
            balance: 0,
        }
    }

    pub fn credit(&mut self, amount: i64) {
        self.total_paid += amount;
        self.balance = self.total_paid - self.total_owed;
    }

    pub fn debit(&mut self, amount: i64) {
        self.total_owed += amount;
        self.balance = self.total_paid - self.total_owed;
    }

    pub fn absorb(&mut self, other: &MemberBalance) {
        self.total_paid += other.total_paid;
        self.total_owed += other.total_owed;
        self.balance = self.total_paid - self.total_owed;
    }
}

pub type BalanceMap = BTreeMap<MemberId, MemberBalance>;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BalanceScope {
    /// Only unpaid allocations, i.e. what is still owed.
    #[default]
    Outstanding,
    /// Paid and unpaid allocations alike.
    Historical,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BalanceReport {
    pub group_id: GroupId,
    pub scope: BalanceScope,
    pub balances: BalanceMap,
    pub warnings: Vec<LedgerWarning>,
}
