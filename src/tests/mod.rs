mod allocation_tests;
mod logging_tests;
mod recorder_tests;

use chrono::{TimeZone, Utc};

use crate::core::ledger::SplitRequest;
use crate::core::models::{Allocation, BalanceMap, Expense, Group, MemberBalance, Role, SplitKind};
use crate::core::services::{LedgerService, NewExpense, NewMember};
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn create_test_service() -> LedgerService<InMemoryLogging, InMemoryStorage> {
    create_test_service_with(InMemoryStorage::new())
}

/// Service over `storage`, which tests keep a handle to for seeding rows.
pub fn create_test_service_with(storage: InMemoryStorage) -> LedgerService<InMemoryLogging, InMemoryStorage> {
    let logging = InMemoryLogging::new();
    LedgerService::new(storage, logging, TEST_JWT_SECRET.to_string())
}

/// Group owned by `owner` with the given extra members.
pub async fn create_test_group(
    service: &LedgerService<InMemoryLogging, InMemoryStorage>,
    owner: &str,
    members: &[(&str, Role)],
) -> Group {
    let members = members
        .iter()
        .map(|(id, role)| NewMember {
            member_id: id.to_string(),
            role: role.clone(),
        })
        .collect();
    service
        .create_group("Trip".to_string(), members, owner)
        .await
        .unwrap()
}

pub fn equal_split(members: &[&str]) -> SplitRequest {
    SplitRequest::Equal {
        members: members.iter().map(|m| m.to_string()).collect(),
    }
}

pub fn new_expense(payer: &str, amount: i64, split: SplitRequest) -> NewExpense {
    NewExpense {
        payer_id: payer.to_string(),
        description: "Dinner".to_string(),
        amount,
        split,
    }
}

/// Expense built directly from (member, amount) pairs, bypassing the service.
pub fn expense(id: &str, group_id: &str, payer: &str, allocations: &[(&str, i64)]) -> Expense {
    let mut expense = Expense {
        id: id.to_string(),
        group_id: group_id.to_string(),
        payer_id: payer.to_string(),
        description: format!("expense {}", id),
        amount: allocations.iter().map(|(_, amount)| amount).sum(),
        split_kind: SplitKind::Custom,
        allocations: allocations
            .iter()
            .map(|(member, amount)| Allocation::new(*member, *amount))
            .collect(),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        is_settled: false,
    };
    expense.refresh_settled();
    expense
}

/// Balance map with the given net balances.
pub fn balances(entries: &[(&str, i64)]) -> BalanceMap {
    entries
        .iter()
        .map(|(id, balance)| {
            let mut entry = MemberBalance::new(*id);
            if *balance >= 0 {
                entry.credit(*balance);
            } else {
                entry.debit(-balance);
            }
            (id.to_string(), entry)
        })
        .collect()
}
