//! Expense service: validation, allocation and persistence in one place.

use std::collections::HashSet;

use engine::{
    Balance, Charge, Expense, ExpenseId, ParticipantId, ParticipantSpending, PaymentInstruction,
    Split,
};
use serde::{Deserialize, Serialize};

use crate::{
    ExpenseDetail, ExpenseRecord, LedgerError, NewExpense, Participant, ResultLedger, Store,
};

/// Roster created for a brand-new group.
const DEFAULT_PARTICIPANTS: [(&str, &str); 3] = [
    ("Alice", "#ef4444"),
    ("Bob", "#3b82f6"),
    ("Charlie", "#10b981"),
];

/// Avatar colour given to participants added by hand.
pub const DEFAULT_AVATAR_COLOR: &str = "#64748b";

/// What a person enters to record or edit an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub payer: ParticipantId,
    pub charge: Charge,
}

/// The group's expense book on top of a [`Store`].
///
/// Balances and settlements are recomputed from the store on every call.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
}

impl<S: Store> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds the default roster when there is nobody yet.
    ///
    /// Returns whether anything was added.
    pub async fn seed_default_participants(&mut self) -> ResultLedger<bool> {
        if !self.store.participants().await?.is_empty() {
            return Ok(false);
        }
        for (name, color) in DEFAULT_PARTICIPANTS {
            self.store.insert_participant(name, Some(color)).await?;
        }
        tracing::info!("seeded {} default participants", DEFAULT_PARTICIPANTS.len());
        Ok(true)
    }

    pub async fn participants(&self) -> ResultLedger<Vec<Participant>> {
        self.store.participants().await
    }

    pub async fn add_participant(&mut self, name: &str) -> ResultLedger<Participant> {
        let name = normalize_participant_name(name)?;
        let participant = self
            .store
            .insert_participant(&name, Some(DEFAULT_AVATAR_COLOR))
            .await?;
        tracing::info!("added participant {} ({})", participant.id, participant.name);
        Ok(participant)
    }

    pub async fn rename_participant(&mut self, id: ParticipantId, name: &str) -> ResultLedger<()> {
        let name = normalize_participant_name(name)?;
        self.store.rename_participant(id, &name).await?;
        tracing::info!("renamed participant {id} to {name}");
        Ok(())
    }

    /// Removes a participant that no expense refers to.
    pub async fn remove_participant(&mut self, id: ParticipantId) -> ResultLedger<()> {
        if !self.store.delete_participant(id).await? {
            return Err(LedgerError::ParticipantInUse(id));
        }
        tracing::info!("removed participant {id}");
        Ok(())
    }

    /// Allocates the draft and stores it with its splits and items.
    pub async fn add_expense(&mut self, draft: &ExpenseDraft) -> ResultLedger<ExpenseId> {
        let expense = self.prepare(draft).await?;
        let amount = expense.amount;
        let id = self.store.insert_expense(expense).await?;
        tracing::info!("recorded expense {id} \"{}\" of {amount}", draft.title.trim());
        Ok(id)
    }

    /// Re-allocates `id` from a new draft, replacing its splits and items.
    pub async fn edit_expense(&mut self, id: ExpenseId, draft: &ExpenseDraft) -> ResultLedger<()> {
        let expense = self.prepare(draft).await?;
        self.store.replace_expense(id, expense).await?;
        tracing::info!("updated expense {id}");
        Ok(())
    }

    pub async fn delete_expense(&mut self, id: ExpenseId) -> ResultLedger<()> {
        self.store.delete_expense(id).await?;
        tracing::info!("deleted expense {id}");
        Ok(())
    }

    /// Newest first.
    pub async fn expenses(&self) -> ResultLedger<Vec<ExpenseRecord>> {
        self.store.expenses().await
    }

    pub async fn expense(&self, id: ExpenseId) -> ResultLedger<ExpenseDetail> {
        let record = self
            .store
            .expenses()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| LedgerError::KeyNotFound(format!("expense {id}")))?;
        let splits = self
            .store
            .splits()
            .await?
            .into_iter()
            .filter(|s| s.expense_id == id)
            .collect();
        let items = self.store.items(id).await?;
        Ok(ExpenseDetail {
            record,
            splits,
            items,
        })
    }

    pub async fn balances(&self) -> ResultLedger<Vec<Balance>> {
        let (roster, expenses, splits) = self.history().await?;
        Ok(engine::balances(&roster, &expenses, &splits)?)
    }

    /// Payments that would settle every balance right now.
    pub async fn settle(&self) -> ResultLedger<Vec<PaymentInstruction>> {
        let balances = self.balances().await?;
        let payments = engine::settle_balances(&balances)?;
        tracing::debug!(
            "settled {} balances with {} payments",
            balances.iter().filter(|b| !b.net.is_zero()).count(),
            payments.len()
        );
        Ok(payments)
    }

    pub async fn spending(&self) -> ResultLedger<Vec<ParticipantSpending>> {
        let (roster, expenses, splits) = self.history().await?;
        Ok(engine::spending_summary(&roster, &expenses, &splits)?)
    }

    /// Deletes every participant and expense.
    pub async fn reset(&mut self) -> ResultLedger<()> {
        self.store.clear().await?;
        tracing::warn!("ledger reset, all participants and expenses deleted");
        Ok(())
    }

    /// Roster, expenses oldest first, and splits, as the engine consumes them.
    async fn history(&self) -> ResultLedger<(Vec<ParticipantId>, Vec<Expense>, Vec<Split>)> {
        let roster = self
            .store
            .participants()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let expenses = self
            .store
            .expenses()
            .await?
            .iter()
            .rev()
            .map(ExpenseRecord::as_expense)
            .collect();
        let splits = self.store.splits().await?;
        tracing::debug!("loaded history with {} splits", splits.len());
        Ok((roster, expenses, splits))
    }

    async fn prepare(&self, draft: &ExpenseDraft) -> ResultLedger<NewExpense> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(LedgerError::InvalidExpense(
                "title must not be empty".to_string(),
            ));
        }

        let roster: HashSet<ParticipantId> = self
            .store
            .participants()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if !roster.contains(&draft.payer) {
            return Err(LedgerError::KeyNotFound(format!(
                "participant {}",
                draft.payer
            )));
        }

        let allocation = draft.charge.allocate()?;
        if let Some(unknown) = allocation.participants().find(|p| !roster.contains(p)) {
            return Err(LedgerError::KeyNotFound(format!("participant {unknown}")));
        }
        if !allocation.total.is_positive() {
            return Err(LedgerError::InvalidExpense(format!(
                "amount must be greater than zero, got {}",
                allocation.total
            )));
        }
        if allocation.shares.is_empty() {
            return Err(LedgerError::InvalidExpense(
                "at least one participant must share the expense".to_string(),
            ));
        }
        // Percentages summing past 100 are absorbed by the remainder and can
        // push a share below zero.
        if let Some(share) = allocation.shares.iter().find(|s| s.amount.is_negative()) {
            return Err(LedgerError::InvalidExpense(format!(
                "participant {} would owe a negative amount ({})",
                share.participant, share.amount
            )));
        }

        Ok(NewExpense {
            title: title.to_string(),
            amount: allocation.total,
            payer: draft.payer,
            shares: allocation.shares,
            items: draft.charge.items().to_vec(),
        })
    }
}

fn normalize_participant_name(value: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidName(
            "participant name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
