pub mod audit;
pub mod balance;
pub mod expense;
pub mod group;
pub mod settlement;
pub mod summary;

pub type MemberId = String;
pub type GroupId = String;
pub type ExpenseId = String;

pub use balance::{BalanceMap, BalanceReport, BalanceScope, MemberBalance};
pub use expense::{Allocation, Expense, SplitKind};
pub use group::{Group, GroupMember, Role};
pub use settlement::{PaymentRecord, SettlementInstruction, SettlementPlan};
pub use summary::GroupSummary;
