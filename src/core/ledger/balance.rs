use crate::core::errors::LedgerWarning;
use crate::core::models::{BalanceMap, BalanceReport, BalanceScope, Expense, Group, MemberBalance};

/// Outstanding balance per member for one group.
///
/// Only unpaid allocations owed by someone other than the payer count.
/// Members with nothing outstanding are absent; use [`balance_of`] to read
/// with a zero default.
pub fn compute_balances(group_id: &str, expenses: &[Expense]) -> BalanceMap {
    compute_balances_with(group_id, expenses, BalanceScope::Outstanding)
}

pub fn compute_balances_with(group_id: &str, expenses: &[Expense], scope: BalanceScope) -> BalanceMap {
    fold_balances(expenses.iter().filter(|e| e.group_id == group_id), scope)
}

/// Balances eligible for settlement against the group's current members.
///
/// Expenses paid by someone who has since left the group are left out and
/// reported as warnings when they still carry an outstanding amount.
pub fn compute_settleable_balances(group: &Group, expenses: &[Expense]) -> BalanceReport {
    let (settleable, orphaned): (Vec<&Expense>, Vec<&Expense>) = expenses
        .iter()
        .filter(|e| e.group_id == group.id)
        .partition(|e| group.is_member(&e.payer_id));

    let warnings = orphaned
        .iter()
        .filter(|e| e.outstanding_amount() > 0)
        .map(|e| LedgerWarning::OrphanedExpense {
            expense_id: e.id.clone(),
            payer_id: e.payer_id.clone(),
        })
        .collect();

    BalanceReport {
        group_id: group.id.clone(),
        scope: BalanceScope::Outstanding,
        balances: fold_balances(settleable, BalanceScope::Outstanding),
        warnings,
    }
}

/// Combines two partial results, e.g. from disjoint slices of one group's
/// expenses.
pub fn merge_balances(mut left: BalanceMap, right: BalanceMap) -> BalanceMap {
    for (member_id, partial) in right {
        left.entry(member_id)
            .or_insert_with_key(|id| MemberBalance::new(id.clone()))
            .absorb(&partial);
    }
    left
}

pub fn balance_of(balances: &BalanceMap, member_id: &str) -> i64 {
    balances.get(member_id).map(|b| b.balance).unwrap_or(0)
}

fn fold_balances<'a>(expenses: impl IntoIterator<Item = &'a Expense>, scope: BalanceScope) -> BalanceMap {
    let mut balances = BalanceMap::new();
    for expense in expenses {
        for allocation in expense
            .allocations
            .iter()
            .filter(|a| a.member_id != expense.payer_id)
            .filter(|a| scope == BalanceScope::Historical || !a.paid)
        {
            balances
                .entry(expense.payer_id.clone())
                .or_insert_with_key(|id| MemberBalance::new(id.clone()))
                .credit(allocation.amount);
            balances
                .entry(allocation.member_id.clone())
                .or_insert_with_key(|id| MemberBalance::new(id.clone()))
                .debit(allocation.amount);
        }
    }
    balances
}
