//! Expense recording and admin corrections.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Expense, Money, ResultEngine, expenses};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Records an expense one member fronted for the room.
    ///
    /// `payer_id` defaults to the caller's own membership; paying on behalf
    /// of someone else requires the admin role.
    pub async fn record_expense(
        &self,
        room_id: &str,
        payer_id: Option<Uuid>,
        amount: Money,
        description: Option<&str>,
        occurred_at: DateTime<Utc>,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let actor = self.require_room_member(&db_tx, room_id, user_id).await?;
            let payer_id = match payer_id {
                Some(id) => {
                    if actor.id != id.to_string() {
                        self.require_room_admin(&db_tx, room_id, user_id).await?;
                    }
                    self.require_member_in_room(&db_tx, room_id, id).await?;
                    id
                }
                None => Uuid::parse_str(&actor.id)
                    .map_err(|_| EngineError::InvalidId("invalid member id".to_string()))?,
            };

            let expense = Expense::new(
                room_id.to_string(),
                payer_id,
                amount,
                description,
                occurred_at,
                user_id.to_string(),
            )?;
            let expense_id = expense.id;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            tracing::debug!(room_id = %room_id, expense_id = %expense_id, amount = %amount, "expense recorded");
            Ok(expense_id)
        })
    }

    /// Voids an expense (admin-only, soft delete).
    ///
    /// History is never rewritten: the row stays, flagged, and the next
    /// balance recomputation simply skips it.
    pub async fn void_expense(
        &self,
        room_id: &str,
        expense_id: Uuid,
        user_id: &str,
        voided_at: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_room_admin(&db_tx, room_id, user_id).await?;

            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .filter(expenses::Column::RoomId.eq(room_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
            if model.voided_at.is_some() {
                return Err(EngineError::AlreadyVoided(expense_id.to_string()));
            }

            let expense_model = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id.to_string()),
                voided_at: ActiveValue::Set(Some(voided_at)),
                voided_by: ActiveValue::Set(Some(user_id.to_string())),
                ..Default::default()
            };
            expense_model.update(&db_tx).await?;

            tracing::info!(room_id = %room_id, expense_id = %expense_id, "expense voided");
            Ok(())
        })
    }

    /// Lists the room's expenses, newest first.
    pub async fn list_expenses(
        &self,
        room_id: &str,
        user_id: &str,
        include_voided: bool,
    ) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_room_member(&db_tx, room_id, user_id).await?;

            let mut query = expenses::Entity::find()
                .filter(expenses::Column::RoomId.eq(room_id.to_string()))
                .order_by_desc(expenses::Column::OccurredAt)
                .order_by_asc(expenses::Column::Id);
            if !include_voided {
                query = query.filter(expenses::Column::VoidedAt.is_null());
            }

            let models: Vec<expenses::Model> = query.all(&db_tx).await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }
}
