//! Allocation & settlement engine.
//!
//! Two independent, pure components:
//!
//! - the **allocator** ([`allocate_equal`], [`allocate_exact`],
//!   [`allocate_by_percent`], [`allocate_by_shares`], [`allocate_itemized`] and
//!   the policy wrappers [`SplitPolicy`] / [`Charge`]) turns an expense total
//!   into per-participant owed amounts that sum to the total exactly;
//! - the **settlement solver** ([`balances`], [`settle`]) turns the recorded
//!   expenses and splits into a short list of payments that zeroes every
//!   balance.
//!
//! All money is integer cents ([`MoneyCents`]); percentages are basis points
//! ([`Percent`]). Nothing here performs I/O or keeps state between calls, so
//! identical inputs always give identical outputs.

pub use allocation::{
    allocate_by_percent, allocate_by_shares, allocate_equal, allocate_exact, distribute_remainder,
};
pub use error::EngineError;
pub use ids::{ExpenseId, ParticipantId};
pub use itemized::{ItemizedAllocation, ItemizedBill, ItemizedShare, LineItem, allocate_itemized};
pub use money::MoneyCents;
pub use percent::Percent;
pub use policy::{Allocation, Charge, Share, SplitPolicy};
pub use receipt::{ReceiptDraft, ReceiptLine};
pub use settlement::{
    Balance, Expense, PaymentInstruction, Split, balances, settle, settle_balances,
};
pub use spending::{ParticipantSpending, group_total, spending_summary};

mod allocation;
mod error;
mod ids;
mod itemized;
mod money;
mod percent;
mod policy;
mod receipt;
mod settlement;
mod spending;

pub type ResultEngine<T> = Result<T, EngineError>;
