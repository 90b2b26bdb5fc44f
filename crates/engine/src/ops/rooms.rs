//! Room lifecycle operations.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};

use crate::{EngineError, Member, ResultEngine, Room, members, rooms};

use super::{Engine, normalize_required_email, normalize_required_name, with_tx};

impl Engine {
    /// Creates a room; the creator becomes its first (admin) member.
    pub async fn new_room(
        &self,
        name: &str,
        creator_email: &str,
        creator_display_name: &str,
        user_id: &str,
    ) -> ResultEngine<String> {
        let name = normalize_required_name(name, "room")?;
        let email = normalize_required_email(creator_email)?;
        let display_name = normalize_required_name(creator_display_name, "member")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let room = Room::new(name, user_id);
            let room_id = room.id.clone();
            rooms::ActiveModel::from(&room).insert(&db_tx).await?;

            let admin = Member::new(
                room_id.clone(),
                email,
                display_name,
                Some(user_id.to_string()),
                true,
            );
            members::ActiveModel::from(&admin).insert(&db_tx).await?;

            tracing::info!(room_id = %room_id, user = %user_id, "room created");
            Ok(room_id)
        })
    }

    /// Fetches a room by id (membership required).
    pub async fn room(&self, room_id: &str, user_id: &str) -> ResultEngine<Room> {
        with_tx!(self, |db_tx| {
            self.require_room_member(&db_tx, room_id, user_id).await?;
            let model = self
                .find_room_by_id(&db_tx, room_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("room not exists".to_string()))?;
            Ok(Room::from(model))
        })
    }

    /// Fetches a room by (case-insensitive) name among the caller's rooms.
    pub async fn room_by_name(&self, room_name: &str, user_id: &str) -> ResultEngine<Room> {
        let room_name = normalize_required_name(room_name, "room")?;
        let room_name_lower = room_name.to_lowercase();
        with_tx!(self, |db_tx| {
            let models: Vec<rooms::Model> = rooms::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(room_name_lower.clone()))
                .all(&db_tx)
                .await?;

            let mut out: Option<rooms::Model> = None;
            for model in models {
                let allowed = self
                    .require_room_member(&db_tx, &model.id, user_id)
                    .await
                    .is_ok();
                if allowed {
                    if out.is_some() {
                        return Err(EngineError::InvalidInput(
                            "ambiguous room name".to_string(),
                        ));
                    }
                    out = Some(model);
                }
            }

            out.map(Room::from)
                .ok_or_else(|| EngineError::KeyNotFound("room not exists".to_string()))
        })
    }

    /// Lists the rooms the user is an active member of.
    pub async fn list_rooms(&self, user_id: &str) -> ResultEngine<Vec<Room>> {
        with_tx!(self, |db_tx| {
            let memberships: Vec<members::Model> = members::Entity::find()
                .filter(members::Column::UserId.eq(user_id.to_string()))
                .filter(members::Column::RemovedAt.is_null())
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(memberships.len());
            for membership in memberships {
                if let Some(model) = self.find_room_by_id(&db_tx, &membership.room_id).await? {
                    out.push(Room::from(model));
                }
            }
            out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(out)
        })
    }
}
