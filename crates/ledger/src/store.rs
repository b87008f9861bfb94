//! Persistence seam of the ledger.

use engine::{ExpenseId, LineItem, ParticipantId, Split};

use crate::{ExpenseRecord, NewExpense, Participant, ResultLedger};

/// Where participants and expenses live.
///
/// Implementations only store and load; every rule about what may be stored
/// is enforced by [`Ledger`](crate::Ledger) before a write reaches the store.
/// Writes that touch several rows (an expense with its splits and items) must
/// be all-or-nothing.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Roster in insertion order.
    async fn participants(&self) -> ResultLedger<Vec<Participant>>;

    async fn insert_participant(
        &mut self,
        name: &str,
        avatar_color: Option<&str>,
    ) -> ResultLedger<Participant>;

    async fn rename_participant(&mut self, id: ParticipantId, name: &str) -> ResultLedger<()>;

    /// Deletes a participant nobody's expenses refer to.
    ///
    /// Returns `false`, deleting nothing, when the participant paid for or
    /// owes on any recorded expense.
    async fn delete_participant(&mut self, id: ParticipantId) -> ResultLedger<bool>;

    /// Every expense, newest first.
    async fn expenses(&self) -> ResultLedger<Vec<ExpenseRecord>>;

    /// Every split of every expense.
    async fn splits(&self) -> ResultLedger<Vec<Split>>;

    /// Line items recorded for an itemized expense, in bill order.
    async fn items(&self, expense: ExpenseId) -> ResultLedger<Vec<LineItem>>;

    async fn insert_expense(&mut self, expense: NewExpense) -> ResultLedger<ExpenseId>;

    /// Overwrites the header of `id` and replaces all of its splits and items.
    async fn replace_expense(&mut self, id: ExpenseId, expense: NewExpense) -> ResultLedger<()>;

    /// Deletes an expense together with its splits, items and assignments.
    async fn delete_expense(&mut self, id: ExpenseId) -> ResultLedger<()>;

    /// Removes every participant and expense.
    async fn clear(&mut self) -> ResultLedger<()>;
}
