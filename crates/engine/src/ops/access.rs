//! Room authorization helpers.
//!
//! Every mutation funnels through these checks instead of re-implementing
//! role logic per operation: reads require an active membership, settlement
//! and member administration require `is_admin`.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, members, rooms, users};

use super::Engine;

impl Engine {
    pub(super) async fn find_room_by_id(
        &self,
        db: &DatabaseTransaction,
        room_id: &str,
    ) -> ResultEngine<Option<rooms::Model>> {
        rooms::Entity::find_by_id(room_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Returns the caller's active membership row, or `KeyNotFound` when the
    /// room does not exist or the caller is not part of it. Non-members learn
    /// nothing about the room's existence.
    pub(super) async fn require_room_member(
        &self,
        db: &DatabaseTransaction,
        room_id: &str,
        user_id: &str,
    ) -> ResultEngine<members::Model> {
        let not_found = || EngineError::KeyNotFound("room not exists".to_string());

        self.find_room_by_id(db, room_id)
            .await?
            .ok_or_else(not_found)?;

        members::Entity::find()
            .filter(members::Column::RoomId.eq(room_id.to_string()))
            .filter(members::Column::UserId.eq(user_id.to_string()))
            .filter(members::Column::RemovedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(not_found)
    }

    /// Like [`Self::require_room_member`] but additionally requires the admin
    /// role; members without it get `Forbidden`.
    pub(super) async fn require_room_admin(
        &self,
        db: &DatabaseTransaction,
        room_id: &str,
        user_id: &str,
    ) -> ResultEngine<members::Model> {
        let member = self.require_room_member(db, room_id, user_id).await?;
        if !member.is_admin {
            return Err(EngineError::Forbidden(
                "admin role required".to_string(),
            ));
        }
        Ok(member)
    }

    /// Looks up an active member of the room by member id.
    pub(super) async fn require_member_in_room(
        &self,
        db: &DatabaseTransaction,
        room_id: &str,
        member_id: Uuid,
    ) -> ResultEngine<members::Model> {
        members::Entity::find_by_id(member_id.to_string())
            .filter(members::Column::RoomId.eq(room_id.to_string()))
            .filter(members::Column::RemovedAt.is_null())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}
