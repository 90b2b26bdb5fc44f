//! Ledger entries: credits and debits against the room pool.
//!
//! Sign convention, load-bearing for every balance computation:
//!
//! - `Credit` = money a member put INTO the room. Stored **positive**.
//! - `Debit` = money the room paid OUT to a member. Stored **negative**, so
//!   summing debit amounts directly (never subtracting) yields what has
//!   already been paid back.
//!
//! The constructors below are the only way to build an entry, so an entry
//! with the wrong sign for its kind cannot exist in memory. Settling never
//! rewrites history: it appends counter-balancing entries.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::InvalidId(format!(
                "invalid ledger entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub room_id: String,
    pub member_id: Uuid,
    /// Signed amount: positive for credits, negative for debits.
    pub amount: Money,
    pub kind: EntryKind,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl LedgerEntry {
    /// Records money a member put into the room. `amount` must be > 0 and is
    /// stored as-is.
    pub fn credit(
        room_id: String,
        member_id: Uuid,
        amount: Money,
        note: Option<String>,
        created_at: DateTime<Utc>,
        created_by: String,
    ) -> Result<Self, EngineError> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "credit amount must be > 0".to_string(),
            ));
        }
        Ok(Self::raw(
            room_id,
            member_id,
            amount,
            EntryKind::Credit,
            note,
            created_at,
            created_by,
        ))
    }

    /// Records money the room paid out to a member. `amount` must be > 0 and
    /// is stored negated.
    pub fn debit(
        room_id: String,
        member_id: Uuid,
        amount: Money,
        note: Option<String>,
        created_at: DateTime<Utc>,
        created_by: String,
    ) -> Result<Self, EngineError> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "debit amount must be > 0".to_string(),
            ));
        }
        Ok(Self::raw(
            room_id,
            member_id,
            -amount,
            EntryKind::Debit,
            note,
            created_at,
            created_by,
        ))
    }

    fn raw(
        room_id: String,
        member_id: Uuid,
        amount: Money,
        kind: EntryKind,
        note: Option<String>,
        created_at: DateTime<Utc>,
        created_by: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            member_id,
            amount,
            kind,
            note,
            created_at,
            created_by,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub room_id: String,
    pub member_id: String,
    pub amount_minor: i64,
    pub kind: String,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
    pub created_by: String,
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
        from = "Column::MemberId",
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

impl From<&LedgerEntry> for ActiveModel {
    fn from(value: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            room_id: ActiveValue::Set(value.room_id.clone()),
            member_id: ActiveValue::Set(value.member_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            note: ActiveValue::Set(value.note.clone()),
            created_at: ActiveValue::Set(value.created_at),
            created_by: ActiveValue::Set(value.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| EngineError::InvalidId("invalid ledger entry id".to_string()))?;
        let member_id = Uuid::parse_str(&value.member_id)
            .map_err(|_| EngineError::InvalidId("invalid member id".to_string()))?;
        let kind = EntryKind::try_from(value.kind.as_str())?;
        Ok(Self {
            id,
            room_id: value.room_id,
            member_id,
            amount: Money::new(value.amount_minor),
            kind,
            note: value.note,
            created_at: value.created_at,
            created_by: value.created_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn credit_keeps_amount_positive() {
        let entry = LedgerEntry::credit(
            "room".to_string(),
            Uuid::new_v4(),
            Money::new(500),
            None,
            Utc::now(),
            "alice".to_string(),
        )
        .unwrap();
        assert_eq!(entry.amount, Money::new(500));
        assert_eq!(entry.kind, EntryKind::Credit);
    }

    #[test]
    fn debit_stores_negated_amount() {
        let entry = LedgerEntry::debit(
            "room".to_string(),
            Uuid::new_v4(),
            Money::new(500),
            None,
            Utc::now(),
            "alice".to_string(),
        )
        .unwrap();
        assert_eq!(entry.amount, Money::new(-500));
        assert_eq!(entry.kind, EntryKind::Debit);
    }

    #[test]
    fn non_positive_amounts_rejected() {
        let id = Uuid::new_v4();
        for amount in [Money::ZERO, Money::new(-100)] {
            assert!(
                LedgerEntry::credit(
                    "room".to_string(),
                    id,
                    amount,
                    None,
                    Utc::now(),
                    "alice".to_string()
                )
                .is_err()
            );
            assert!(
                LedgerEntry::debit(
                    "room".to_string(),
                    id,
                    amount,
                    None,
                    Utc::now(),
                    "alice".to_string()
                )
                .is_err()
            );
        }
    }
}
