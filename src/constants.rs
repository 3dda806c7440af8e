/// Balances with an absolute value below this many minor units are settled.
pub const SETTLEMENT_TOLERANCE: i64 = 1;

/// Allowed drift when percentages are checked against 100.
pub const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// Upper bound for a single expense, in minor units.
pub const MAX_EXPENSE_AMOUNT: i64 = 10_000_000_000;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Application log entries kept in memory before the oldest are dropped.
pub const MAX_RETAINED_LOGS: usize = 10_000;

// Audit actions
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const MEMBER_ADDED: &str = "MEMBER_ADDED";
pub const MEMBER_REMOVED: &str = "MEMBER_REMOVED";
pub const MEMBER_ROLE_UPDATED: &str = "MEMBER_ROLE_UPDATED";
pub const EXPENSE_ADDED: &str = "EXPENSE_ADDED";
pub const ALLOCATION_PAID: &str = "ALLOCATION_PAID";
pub const ALLOCATION_UNPAID: &str = "ALLOCATION_UNPAID";
