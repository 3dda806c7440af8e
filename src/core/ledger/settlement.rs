//! Greedy debt netting.
//!
//! The planner repeatedly pairs the largest remaining creditor with the
//! largest remaining debtor and moves the smaller of the two amounts. Every
//! step retires at least one party, so a plan never has more than
//! `creditors + debtors - 1` instructions. It does not search for the true
//! minimum number of payments, which is NP-hard in general.
//!
//! Ordering is a contract: parties are ranked by magnitude, then by member
//! identifier ascending, so the same balances always yield the same plan.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::constants::SETTLEMENT_TOLERANCE;
use crate::core::models::{BalanceMap, MemberId, SettlementInstruction};

#[derive(Debug, PartialEq, Eq)]
struct Party {
    remaining: i64,
    member_id: MemberId,
}

impl Ord for Party {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: larger amounts first, then the smaller identifier.
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| other.member_id.cmp(&self.member_id))
    }
}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn plan_settlement(balances: &BalanceMap) -> Vec<SettlementInstruction> {
    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();

    for entry in balances.values() {
        if entry.balance >= SETTLEMENT_TOLERANCE {
            creditors.push(Party {
                remaining: entry.balance,
                member_id: entry.member_id.clone(),
            });
        } else if entry.balance <= -SETTLEMENT_TOLERANCE {
            debtors.push(Party {
                remaining: entry.balance.saturating_neg(),
                member_id: entry.member_id.clone(),
            });
        }
    }

    let mut instructions = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));

    while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
        let amount = creditor.remaining.min(debtor.remaining);
        instructions.push(SettlementInstruction {
            from: debtor.member_id.clone(),
            to: creditor.member_id.clone(),
            amount,
        });

        creditor.remaining -= amount;
        debtor.remaining -= amount;

        if creditor.remaining >= SETTLEMENT_TOLERANCE {
            creditors.push(creditor);
        }
        if debtor.remaining >= SETTLEMENT_TOLERANCE {
            debtors.push(debtor);
        }
    }

    instructions
}

/// Balances left over after every instruction is paid.
pub fn apply_plan(balances: &BalanceMap, instructions: &[SettlementInstruction]) -> BTreeMap<MemberId, i64> {
    let mut residual: BTreeMap<MemberId, i64> = balances
        .iter()
        .map(|(id, entry)| (id.clone(), entry.balance))
        .collect();

    for instruction in instructions {
        *residual.entry(instruction.from.clone()).or_insert(0) += instruction.amount;
        *residual.entry(instruction.to.clone()).or_insert(0) -= instruction.amount;
    }

    residual
}
