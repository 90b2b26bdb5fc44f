//! Member administration (admin-only mutations).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Member, ResultEngine, members};

use super::{Engine, normalize_required_email, normalize_required_name, with_tx};

impl Engine {
    /// Adds a member to a room (admin-only). The email must be unique among
    /// the room's active members; `link_user_id` attaches an existing account
    /// so the person can log in.
    pub async fn add_member(
        &self,
        room_id: &str,
        email: &str,
        display_name: &str,
        link_user_id: Option<&str>,
        is_admin: bool,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let email = normalize_required_email(email)?;
        let display_name = normalize_required_name(display_name, "member")?;
        with_tx!(self, |db_tx| {
            self.require_room_admin(&db_tx, room_id, user_id).await?;
            if let Some(link) = link_user_id {
                self.require_user_exists(&db_tx, link).await?;
            }

            let duplicate = members::Entity::find()
                .filter(members::Column::RoomId.eq(room_id.to_string()))
                .filter(members::Column::Email.eq(email.clone()))
                .filter(members::Column::RemovedAt.is_null())
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let member = Member::new(
                room_id.to_string(),
                email,
                display_name,
                link_user_id.map(ToString::to_string),
                is_admin,
            );
            let member_id = member.id;
            members::ActiveModel::from(&member).insert(&db_tx).await?;

            tracing::info!(room_id = %room_id, member_id = %member_id, "member added");
            Ok(member_id)
        })
    }

    /// Removes a member (admin-only). Removal is soft: the row keeps its id
    /// so historical expenses and ledger entries stay resolvable, but the
    /// member disappears from the active set and from balance computations.
    pub async fn remove_member(
        &self,
        room_id: &str,
        member_id: Uuid,
        user_id: &str,
        removed_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let actor = self.require_room_admin(&db_tx, room_id, user_id).await?;
            if actor.id == member_id.to_string() {
                return Err(EngineError::InvalidInput(
                    "cannot remove yourself".to_string(),
                ));
            }
            self.require_member_in_room(&db_tx, room_id, member_id)
                .await?;

            let member_model = members::ActiveModel {
                id: ActiveValue::Set(member_id.to_string()),
                removed_at: ActiveValue::Set(Some(removed_at)),
                ..Default::default()
            };
            member_model.update(&db_tx).await?;

            tracing::info!(room_id = %room_id, member_id = %member_id, "member removed");
            Ok(())
        })
    }

    /// Grants or revokes the admin role (admin-only).
    pub async fn set_member_admin(
        &self,
        room_id: &str,
        member_id: Uuid,
        is_admin: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let actor = self.require_room_admin(&db_tx, room_id, user_id).await?;
            if actor.id == member_id.to_string() && !is_admin {
                return Err(EngineError::InvalidInput(
                    "cannot revoke your own admin role".to_string(),
                ));
            }
            self.require_member_in_room(&db_tx, room_id, member_id)
                .await?;

            let member_model = members::ActiveModel {
                id: ActiveValue::Set(member_id.to_string()),
                is_admin: ActiveValue::Set(is_admin),
                ..Default::default()
            };
            member_model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Lists the room's active members (membership required).
    pub async fn list_members(&self, room_id: &str, user_id: &str) -> ResultEngine<Vec<Member>> {
        with_tx!(self, |db_tx| {
            self.require_room_member(&db_tx, room_id, user_id).await?;

            let models: Vec<members::Model> = members::Entity::find()
                .filter(members::Column::RoomId.eq(room_id.to_string()))
                .filter(members::Column::RemovedAt.is_null())
                .order_by_asc(members::Column::Id)
                .all(&db_tx)
                .await?;

            models.into_iter().map(Member::try_from).collect()
        })
    }
}
