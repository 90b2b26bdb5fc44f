//! Single-entry ledger mutations.
//!
//! All three operations append; none mutates history. The sign convention is
//! enforced by the [`LedgerEntry`] constructors: contributions and
//! collections are positive credits, payouts are negative debits.
//!
//! A collection (a debtor handing over what they owe) is deliberately
//! indistinguishable from a voluntary contribution at the ledger level: the
//! ledger tracks net effect, not intent.

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{LedgerEntry, Money, ResultEngine, ledger_entries};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Records money a member paid into the room (self or admin).
    pub async fn record_contribution(
        &self,
        room_id: &str,
        member_id: Uuid,
        amount: Money,
        note: Option<&str>,
        user_id: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            let actor = self.require_room_member(&db_tx, room_id, user_id).await?;
            if actor.id != member_id.to_string() {
                self.require_room_admin(&db_tx, room_id, user_id).await?;
            }
            self.require_member_in_room(&db_tx, room_id, member_id)
                .await?;

            let entry = LedgerEntry::credit(
                room_id.to_string(),
                member_id,
                amount,
                note,
                created_at,
                user_id.to_string(),
            )?;
            let entry_id = entry.id;
            ledger_entries::ActiveModel::from(&entry)
                .insert(&db_tx)
                .await?;

            tracing::debug!(room_id = %room_id, member_id = %member_id, amount = %amount, "contribution recorded");
            Ok(entry_id)
        })
    }

    /// Pays a creditor back out of the room pool (admin-only). Stored as a
    /// negative debit so the next recomputation sees the reduced pending.
    pub async fn record_settlement_payout(
        &self,
        room_id: &str,
        member_id: Uuid,
        amount: Money,
        note: Option<&str>,
        user_id: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            self.require_room_admin(&db_tx, room_id, user_id).await?;
            self.require_member_in_room(&db_tx, room_id, member_id)
                .await?;

            let entry = LedgerEntry::debit(
                room_id.to_string(),
                member_id,
                amount,
                note,
                created_at,
                user_id.to_string(),
            )?;
            let entry_id = entry.id;
            ledger_entries::ActiveModel::from(&entry)
                .insert(&db_tx)
                .await?;

            tracing::info!(room_id = %room_id, member_id = %member_id, amount = %amount, "settlement payout recorded");
            Ok(entry_id)
        })
    }

    /// Collects what a debtor owes (admin-only). Ledger-wise a credit.
    pub async fn record_settlement_collection(
        &self,
        room_id: &str,
        member_id: Uuid,
        amount: Money,
        note: Option<&str>,
        user_id: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let note = normalize_optional_text(note);
        with_tx!(self, |db_tx| {
            self.require_room_admin(&db_tx, room_id, user_id).await?;
            self.require_member_in_room(&db_tx, room_id, member_id)
                .await?;

            let entry = LedgerEntry::credit(
                room_id.to_string(),
                member_id,
                amount,
                note,
                created_at,
                user_id.to_string(),
            )?;
            let entry_id = entry.id;
            ledger_entries::ActiveModel::from(&entry)
                .insert(&db_tx)
                .await?;

            tracing::info!(room_id = %room_id, member_id = %member_id, amount = %amount, "settlement collection recorded");
            Ok(entry_id)
        })
    }

    /// Lists the room's ledger entries, oldest first.
    pub async fn list_ledger_entries(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            self.require_room_member(&db_tx, room_id, user_id).await?;

            let models: Vec<ledger_entries::Model> = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::RoomId.eq(room_id.to_string()))
                .order_by_asc(ledger_entries::Column::CreatedAt)
                .order_by_asc(ledger_entries::Column::Id)
                .all(&db_tx)
                .await?;

            models.into_iter().map(LedgerEntry::try_from).collect()
        })
    }
}
