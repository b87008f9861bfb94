//! The module contains the expense records and the `expenses` table.

use chrono::{DateTime, Utc};
use engine::{Expense, ExpenseId, LineItem, MoneyCents, ParticipantId, Share, Split};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A persisted expense header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub title: String,
    /// Total paid, always equal to the sum of the expense's splits.
    pub amount: MoneyCents,
    pub payer: ParticipantId,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// The record as the settlement solver sees it.
    #[must_use]
    pub fn as_expense(&self) -> Expense {
        Expense {
            id: self.id,
            total: self.amount,
            payer: self.payer,
        }
    }
}

/// An expense ready to be stored: header, owed amounts and optional items,
/// written together or not at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    pub title: String,
    pub amount: MoneyCents,
    pub payer: ParticipantId,
    pub shares: Vec<Share>,
    pub items: Vec<LineItem>,
}

impl NewExpense {
    pub(crate) fn splits(&self, expense_id: ExpenseId) -> impl Iterator<Item = Split> + '_ {
        self.shares.iter().map(move |share| Split {
            expense_id,
            participant: share.participant,
            amount_owed: share.amount,
        })
    }
}

/// An expense with everything recorded for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDetail {
    pub record: ExpenseRecord,
    pub splits: Vec<Split>,
    /// Empty unless the expense was itemized.
    pub items: Vec<LineItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub amount: i64,
    pub payer_id: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ExpenseRecord {
    fn from(model: Model) -> Self {
        Self {
            id: ExpenseId(model.id),
            title: model.title,
            amount: MoneyCents::new(model.amount),
            payer: ParticipantId(model.payer_id),
            created_at: model.created_at,
        }
    }
}
