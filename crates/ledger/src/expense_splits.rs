//! The `expense_splits` table: one owed amount per participant and expense.

use engine::{ExpenseId, MoneyCents, ParticipantId, Split};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub expense_id: i64,
    pub participant_id: i64,
    pub amount_owed: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Split {
    fn from(model: Model) -> Self {
        Self {
            expense_id: ExpenseId(model.expense_id),
            participant: ParticipantId(model.participant_id),
            amount_owed: MoneyCents::new(model.amount_owed),
        }
    }
}
