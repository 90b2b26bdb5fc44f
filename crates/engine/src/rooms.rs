//! A `Room` groups the members that share expenses and the ledger that
//! records how money moved between them.

use sea_orm::{ActiveValue, prelude::*};

/// A shared-expense group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub created_by: String,
}

impl Room {
    pub fn new(name: String, created_by: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            created_by: created_by.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::members::Entity")]
    Members,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Room> for ActiveModel {
    fn from(value: &Room) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            created_by: ActiveValue::Set(value.created_by.clone()),
        }
    }
}

impl From<Model> for Room {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
            created_by: value.created_by,
        }
    }
}
