//! Group expense book.
//!
//! [`Ledger`] validates what a person enters, lets the `engine` crate allocate
//! it and hands the result to a [`Store`]. Two stores are provided:
//! [`MemoryStore`] for throwaway sessions and tests, and [`DbStore`] for SQLite
//! through sea-orm.

pub use db::DbStore;
pub use error::LedgerError;
pub use expenses::{ExpenseDetail, ExpenseRecord, NewExpense};
pub use memory::MemoryStore;
pub use participants::Participant;
pub use service::{DEFAULT_AVATAR_COLOR, ExpenseDraft, Ledger};
pub use store::Store;

mod db;
mod error;
mod expense_items;
mod expense_splits;
mod expenses;
mod item_assignments;
mod memory;
mod participants;
mod service;
mod store;

pub type ResultLedger<T> = Result<T, LedgerError>;
