//! In-memory [`Store`], used when no database is configured and in tests.

use chrono::Utc;
use engine::{ExpenseId, LineItem, ParticipantId, Split};

use crate::{ExpenseRecord, LedgerError, NewExpense, Participant, ResultLedger, Store};

/// Keeps everything in plain vectors.
///
/// Ids are assigned from counters owned by the instance, so two stores never
/// share state. [`Store::clear`] resets the counters too.
#[derive(Debug, Default)]
pub struct MemoryStore {
    participants: Vec<Participant>,
    expenses: Vec<ExpenseRecord>,
    splits: Vec<Split>,
    items: Vec<(ExpenseId, LineItem)>,
    last_participant_id: i64,
    last_expense_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn participant_mut(&mut self, id: ParticipantId) -> ResultLedger<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::KeyNotFound(format!("participant {id}")))
    }

    fn expense_index(&self, id: ExpenseId) -> ResultLedger<usize> {
        self.expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| LedgerError::KeyNotFound(format!("expense {id}")))
    }

    fn is_referenced(&self, id: ParticipantId) -> bool {
        self.expenses.iter().any(|e| e.payer == id)
            || self.splits.iter().any(|s| s.participant == id)
            || self
                .items
                .iter()
                .any(|(_, item)| item.assigned.contains(&id))
    }

    fn remove_details(&mut self, id: ExpenseId) {
        self.splits.retain(|s| s.expense_id != id);
        self.items.retain(|(expense_id, _)| *expense_id != id);
    }

    fn write_details(&mut self, id: ExpenseId, expense: &NewExpense) {
        self.splits.extend(expense.splits(id));
        self.items
            .extend(expense.items.iter().cloned().map(|item| (id, item)));
    }
}

impl Store for MemoryStore {
    async fn participants(&self) -> ResultLedger<Vec<Participant>> {
        Ok(self.participants.clone())
    }

    async fn insert_participant(
        &mut self,
        name: &str,
        avatar_color: Option<&str>,
    ) -> ResultLedger<Participant> {
        self.last_participant_id += 1;
        let participant = Participant {
            id: ParticipantId(self.last_participant_id),
            name: name.to_string(),
            avatar_color: avatar_color.map(ToString::to_string),
        };
        self.participants.push(participant.clone());
        Ok(participant)
    }

    async fn rename_participant(&mut self, id: ParticipantId, name: &str) -> ResultLedger<()> {
        self.participant_mut(id)?.name = name.to_string();
        Ok(())
    }

    async fn delete_participant(&mut self, id: ParticipantId) -> ResultLedger<bool> {
        self.participant_mut(id)?;
        if self.is_referenced(id) {
            return Ok(false);
        }
        self.participants.retain(|p| p.id != id);
        Ok(true)
    }

    async fn expenses(&self) -> ResultLedger<Vec<ExpenseRecord>> {
        let mut expenses = self.expenses.clone();
        expenses.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(expenses)
    }

    async fn splits(&self) -> ResultLedger<Vec<Split>> {
        Ok(self.splits.clone())
    }

    async fn items(&self, expense: ExpenseId) -> ResultLedger<Vec<LineItem>> {
        Ok(self
            .items
            .iter()
            .filter(|(id, _)| *id == expense)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn insert_expense(&mut self, expense: NewExpense) -> ResultLedger<ExpenseId> {
        self.last_expense_id += 1;
        let id = ExpenseId(self.last_expense_id);
        self.expenses.push(ExpenseRecord {
            id,
            title: expense.title.clone(),
            amount: expense.amount,
            payer: expense.payer,
            created_at: Utc::now(),
        });
        self.write_details(id, &expense);
        Ok(id)
    }

    async fn replace_expense(&mut self, id: ExpenseId, expense: NewExpense) -> ResultLedger<()> {
        let index = self.expense_index(id)?;
        let record = &mut self.expenses[index];
        record.title = expense.title.clone();
        record.amount = expense.amount;
        record.payer = expense.payer;

        self.remove_details(id);
        self.write_details(id, &expense);
        Ok(())
    }

    async fn delete_expense(&mut self, id: ExpenseId) -> ResultLedger<()> {
        let index = self.expense_index(id)?;
        self.remove_details(id);
        self.expenses.remove(index);
        Ok(())
    }

    async fn clear(&mut self) -> ResultLedger<()> {
        *self = Self::default();
        Ok(())
    }
}
