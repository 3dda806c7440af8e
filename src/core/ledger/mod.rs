//! Pure ledger computations.
//!
//! Everything here works on data handed in by the caller: no storage, no
//! clocks, no caches. The service layer fetches the current records and
//! calls into these functions on every request.

pub mod allocation;
pub mod balance;
pub mod recorder;
pub mod settlement;
pub mod summary;

pub use allocation::{CustomAmount, PercentageShare, SplitRequest, WeightedShare, validate_allocations};
pub use balance::{
    balance_of, compute_balances, compute_balances_with, compute_settleable_balances, merge_balances,
};
pub use recorder::{SettlementRecorder, apply_payment};
pub use settlement::{apply_plan, plan_settlement};
pub use summary::summarize_group;
