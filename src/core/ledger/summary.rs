use crate::core::ledger::balance::compute_settleable_balances;
use crate::core::models::{Expense, Group, GroupSummary};

pub fn summarize_group(group: &Group, expenses: &[Expense]) -> GroupSummary {
    let group_expenses: Vec<&Expense> = expenses.iter().filter(|e| e.group_id == group.id).collect();
    let report = compute_settleable_balances(group, expenses);

    GroupSummary {
        group_id: group.id.clone(),
        expense_count: group_expenses.len(),
        total_expenses: group_expenses.iter().map(|e| e.amount).sum(),
        unsettled_expense_count: group_expenses.iter().filter(|e| !e.is_settled).count(),
        unsettled_amount: group_expenses.iter().map(|e| e.outstanding_amount()).sum(),
        balances: report.balances.into_values().collect(),
        warnings: report.warnings,
    }
}
