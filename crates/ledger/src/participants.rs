//! The module contains the `Participant` record and its table.

use engine::ParticipantId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member of the group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Hex colour used for the avatar, e.g. `#3b82f6`.
    pub avatar_color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub avatar_color: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Participant {
    fn from(model: Model) -> Self {
        Self {
            id: ParticipantId(model.id),
            name: model.name,
            avatar_color: model.avatar_color,
        }
    }
}
