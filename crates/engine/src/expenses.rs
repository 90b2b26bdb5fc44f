//! Expenses: money one member fronted on behalf of the room.
//!
//! Expenses are append-only from the balance computation's point of view.
//! Admin corrections are soft voids (`voided_at`/`voided_by`); balances are
//! always recomputed from the full history, so a void needs no compensating
//! arithmetic.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub room_id: String,
    /// Member that paid.
    pub payer_id: Uuid,
    pub amount: Money,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_by: String,
    pub voided_at: Option<DateTime<Utc>>,
    pub voided_by: Option<String>,
}

impl Expense {
    pub fn new(
        room_id: String,
        payer_id: Uuid,
        amount: Money,
        description: Option<String>,
        occurred_at: DateTime<Utc>,
        created_by: String,
    ) -> Result<Self, EngineError> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            room_id,
            payer_id,
            amount,
            description,
            occurred_at,
            created_by,
            voided_at: None,
            voided_by: None,
        })
    }

    pub fn is_voided(&self) -> bool {
        self.voided_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub room_id: String,
    pub payer_id: String,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_by: String,
    pub voided_at: Option<DateTimeUtc>,
    pub voided_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rooms::Entity",
        from = "Column::RoomId",
        to = "super::rooms::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Rooms,
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::PayerId",
        to = "super::members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Members,
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(value: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            room_id: ActiveValue::Set(value.room_id.clone()),
            payer_id: ActiveValue::Set(value.payer_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            description: ActiveValue::Set(value.description.clone()),
            occurred_at: ActiveValue::Set(value.occurred_at),
            created_by: ActiveValue::Set(value.created_by.clone()),
            voided_at: ActiveValue::Set(value.voided_at),
            voided_by: ActiveValue::Set(value.voided_by.clone()),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::InvalidId("invalid expense id".to_string()))?;
        let payer_id = Uuid::parse_str(&value.payer_id)
            .map_err(|_| EngineError::InvalidId("invalid payer id".to_string()))?;
        Ok(Self {
            id,
            room_id: value.room_id,
            payer_id,
            amount: Money::new(value.amount_minor),
            description: value.description,
            occurred_at: value.occurred_at,
            created_by: value.created_by,
            voided_at: value.voided_at,
            voided_by: value.voided_by,
        })
    }
}
