//! Room members.
//!
//! A member is room-scoped; the same person shows up once per room, keyed by
//! a stable UUID. The email is the unique human-facing key inside a room and
//! is what the balance computation deduplicates on. Removal is soft
//! (`removed_at`), so historical expenses and ledger entries keep a valid
//! reference.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    pub room_id: String,
    pub email: String,
    pub display_name: String,
    /// Username of the account this member is linked to, if any. Members
    /// added by an admin before the person registers have no account yet.
    pub user_id: Option<String>,
    pub is_admin: bool,
    pub removed_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn new(
        room_id: String,
        email: String,
        display_name: String,
        user_id: Option<String>,
        is_admin: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            email,
            display_name,
            user_id,
            is_admin,
            removed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.removed_at.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub room_id: String,
    pub email: String,
    pub display_name: String,
    pub user_id: Option<String>,
    pub is_admin: bool,
    pub removed_at: Option<DateTimeUtc>,
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
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(value: &Member) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            room_id: ActiveValue::Set(value.room_id.clone()),
            email: ActiveValue::Set(value.email.clone()),
            display_name: ActiveValue::Set(value.display_name.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            is_admin: ActiveValue::Set(value.is_admin),
            removed_at: ActiveValue::Set(value.removed_at),
        }
    }
}

impl TryFrom<Model> for Member {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::InvalidId("invalid member id".to_string()))?;
        Ok(Self {
            id,
            room_id: value.room_id,
            email: value.email,
            display_name: value.display_name,
            user_id: value.user_id,
            is_admin: value.is_admin,
            removed_at: value.removed_at,
        })
    }
}
