//! [`Store`] backed by SQLite through sea-orm.

use chrono::Utc;
use engine::{ExpenseId, LineItem, MoneyCents, ParticipantId, Split};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use crate::{
    ExpenseRecord, LedgerError, NewExpense, Participant, ResultLedger, Store, expense_items,
    expense_splits, expenses, item_assignments, participants,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

#[derive(Debug, Clone)]
pub struct DbStore {
    database: DatabaseConnection,
}

impl DbStore {
    /// Wraps a connection whose schema is already migrated.
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Connects to `url` and brings the schema up to date.
    pub async fn connect(url: &str) -> ResultLedger<Self> {
        let database = Database::connect(url).await?;
        Migrator::up(&database, None).await?;
        Ok(Self::new(database))
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

async fn write_details<C: ConnectionTrait>(
    db: &C,
    id: ExpenseId,
    expense: &NewExpense,
) -> ResultLedger<()> {
    for split in expense.splits(id) {
        expense_splits::ActiveModel {
            id: ActiveValue::NotSet,
            expense_id: ActiveValue::Set(split.expense_id.0),
            participant_id: ActiveValue::Set(split.participant.0),
            amount_owed: ActiveValue::Set(split.amount_owed.cents()),
        }
        .insert(db)
        .await?;
    }

    for item in &expense.items {
        let model = expense_items::ActiveModel {
            id: ActiveValue::NotSet,
            expense_id: ActiveValue::Set(id.0),
            name: ActiveValue::Set(item.name.clone()),
            amount: ActiveValue::Set(item.amount.cents()),
        }
        .insert(db)
        .await?;

        for participant in &item.assigned {
            item_assignments::ActiveModel {
                id: ActiveValue::NotSet,
                item_id: ActiveValue::Set(model.id),
                participant_id: ActiveValue::Set(participant.0),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

async fn delete_details<C: ConnectionTrait>(db: &C, id: ExpenseId) -> ResultLedger<()> {
    let item_ids: Vec<i64> = expense_items::Entity::find()
        .filter(expense_items::Column::ExpenseId.eq(id.0))
        .all(db)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();

    if !item_ids.is_empty() {
        item_assignments::Entity::delete_many()
            .filter(item_assignments::Column::ItemId.is_in(item_ids))
            .exec(db)
            .await?;
    }
    expense_items::Entity::delete_many()
        .filter(expense_items::Column::ExpenseId.eq(id.0))
        .exec(db)
        .await?;
    expense_splits::Entity::delete_many()
        .filter(expense_splits::Column::ExpenseId.eq(id.0))
        .exec(db)
        .await?;
    Ok(())
}

async fn require_expense<C: ConnectionTrait>(
    db: &C,
    id: ExpenseId,
) -> ResultLedger<expenses::Model> {
    expenses::Entity::find_by_id(id.0)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound(format!("expense {id}")))
}

async fn require_participant<C: ConnectionTrait>(
    db: &C,
    id: ParticipantId,
) -> ResultLedger<participants::Model> {
    participants::Entity::find_by_id(id.0)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound(format!("participant {id}")))
}

impl Store for DbStore {
    async fn participants(&self) -> ResultLedger<Vec<Participant>> {
        let models = participants::Entity::find()
            .order_by_asc(participants::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Participant::from).collect())
    }

    async fn insert_participant(
        &mut self,
        name: &str,
        avatar_color: Option<&str>,
    ) -> ResultLedger<Participant> {
        let model = participants::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name.to_string()),
            avatar_color: ActiveValue::Set(avatar_color.map(ToString::to_string)),
        }
        .insert(&self.database)
        .await?;
        Ok(model.into())
    }

    async fn rename_participant(&mut self, id: ParticipantId, name: &str) -> ResultLedger<()> {
        let model = require_participant(&self.database, id).await?;
        let mut participant: participants::ActiveModel = model.into();
        participant.name = ActiveValue::Set(name.to_string());
        participant.update(&self.database).await?;
        Ok(())
    }

    async fn delete_participant(&mut self, id: ParticipantId) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            require_participant(&db_tx, id).await?;

            let paid = expenses::Entity::find()
                .filter(expenses::Column::PayerId.eq(id.0))
                .count(&db_tx)
                .await?;
            let owed = expense_splits::Entity::find()
                .filter(expense_splits::Column::ParticipantId.eq(id.0))
                .count(&db_tx)
                .await?;
            let assigned = item_assignments::Entity::find()
                .filter(item_assignments::Column::ParticipantId.eq(id.0))
                .count(&db_tx)
                .await?;

            if paid + owed + assigned > 0 {
                Ok(false)
            } else {
                participants::Entity::delete_by_id(id.0)
                    .exec(&db_tx)
                    .await?;
                Ok(true)
            }
        })
    }

    async fn expenses(&self) -> ResultLedger<Vec<ExpenseRecord>> {
        let models = expenses::Entity::find()
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(ExpenseRecord::from).collect())
    }

    async fn splits(&self) -> ResultLedger<Vec<Split>> {
        let models = expense_splits::Entity::find()
            .order_by_asc(expense_splits::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Split::from).collect())
    }

    async fn items(&self, expense: ExpenseId) -> ResultLedger<Vec<LineItem>> {
        let items = expense_items::Entity::find()
            .filter(expense_items::Column::ExpenseId.eq(expense.0))
            .order_by_asc(expense_items::Column::Id)
            .all(&self.database)
            .await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let assignments = item_assignments::Entity::find()
            .filter(item_assignments::Column::ItemId.is_in(items.iter().map(|item| item.id)))
            .order_by_asc(item_assignments::Column::Id)
            .all(&self.database)
            .await?;

        Ok(items
            .into_iter()
            .map(|item| {
                let assigned = assignments
                    .iter()
                    .filter(|a| a.item_id == item.id)
                    .map(|a| ParticipantId(a.participant_id))
                    .collect();
                LineItem::new(item.name, MoneyCents::new(item.amount), assigned)
            })
            .collect())
    }

    async fn insert_expense(&mut self, expense: NewExpense) -> ResultLedger<ExpenseId> {
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            let model = expenses::ActiveModel {
                id: ActiveValue::NotSet,
                title: ActiveValue::Set(expense.title.clone()),
                amount: ActiveValue::Set(expense.amount.cents()),
                payer_id: ActiveValue::Set(expense.payer.0),
                created_at: ActiveValue::Set(created_at),
            }
            .insert(&db_tx)
            .await?;

            let id = ExpenseId(model.id);
            write_details(&db_tx, id, &expense).await?;
            Ok(id)
        })
    }

    async fn replace_expense(&mut self, id: ExpenseId, expense: NewExpense) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_expense(&db_tx, id).await?;
            let mut header: expenses::ActiveModel = model.into();
            header.title = ActiveValue::Set(expense.title.clone());
            header.amount = ActiveValue::Set(expense.amount.cents());
            header.payer_id = ActiveValue::Set(expense.payer.0);
            header.update(&db_tx).await?;

            delete_details(&db_tx, id).await?;
            write_details(&db_tx, id, &expense).await?;
            Ok(())
        })
    }

    async fn delete_expense(&mut self, id: ExpenseId) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            require_expense(&db_tx, id).await?;
            delete_details(&db_tx, id).await?;
            expenses::Entity::delete_by_id(id.0).exec(&db_tx).await?;
            Ok(())
        })
    }

    async fn clear(&mut self) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            item_assignments::Entity::delete_many().exec(&db_tx).await?;
            expense_items::Entity::delete_many().exec(&db_tx).await?;
            expense_splits::Entity::delete_many().exec(&db_tx).await?;
            expenses::Entity::delete_many().exec(&db_tx).await?;
            participants::Entity::delete_many().exec(&db_tx).await?;
            Ok(())
        })
    }
}
