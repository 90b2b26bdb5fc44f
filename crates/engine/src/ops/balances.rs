//! Read-side balance/plan queries and the batch settle operation.

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, LedgerEntry, Member, Money, ResultEngine, compute_balances,
    balance::MemberBalance, expenses, ledger_entries, members, plan_transfers,
    settlement::SettlementTransfer,
};

use super::{Engine, with_tx};

/// Result of a successful [`Engine::settle_all`]: the rows that were
/// appended and the post-settlement balances, so the host can notify the
/// affected members.
#[derive(Clone, Debug)]
pub struct SettleOutcome {
    pub entries: Vec<LedgerEntry>,
    pub balances: Vec<MemberBalance>,
}

struct RoomSnapshot {
    members: Vec<Member>,
    expenses: Vec<Expense>,
    entries: Vec<LedgerEntry>,
}

impl Engine {
    async fn load_room_snapshot(
        &self,
        db: &DatabaseTransaction,
        room_id: &str,
    ) -> ResultEngine<RoomSnapshot> {
        let member_models: Vec<members::Model> = members::Entity::find()
            .filter(members::Column::RoomId.eq(room_id.to_string()))
            .filter(members::Column::RemovedAt.is_null())
            .order_by_asc(members::Column::Id)
            .all(db)
            .await?;
        let expense_models: Vec<expenses::Model> = expenses::Entity::find()
            .filter(expenses::Column::RoomId.eq(room_id.to_string()))
            .all(db)
            .await?;
        let entry_models: Vec<ledger_entries::Model> = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::RoomId.eq(room_id.to_string()))
            .all(db)
            .await?;

        Ok(RoomSnapshot {
            members: member_models
                .into_iter()
                .map(Member::try_from)
                .collect::<ResultEngine<_>>()?,
            expenses: expense_models
                .into_iter()
                .map(Expense::try_from)
                .collect::<ResultEngine<_>>()?,
            entries: entry_models
                .into_iter()
                .map(LedgerEntry::try_from)
                .collect::<ResultEngine<_>>()?,
        })
    }

    /// Computes every active member's balance from the room's full history.
    pub async fn room_balances(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<MemberBalance>> {
        with_tx!(self, |db_tx| {
            self.require_room_member(&db_tx, room_id, user_id).await?;
            let snapshot = self.load_room_snapshot(&db_tx, room_id).await?;
            Ok(compute_balances(
                &snapshot.members,
                &snapshot.expenses,
                &snapshot.entries,
            ))
        })
    }

    /// Derives the pairwise transfers that would settle the room.
    pub async fn settlement_plan(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<SettlementTransfer>> {
        let balances = self.room_balances(room_id, user_id).await?;
        Ok(plan_transfers(&balances))
    }

    /// Settles the whole room in one batch (admin-only).
    ///
    /// `expected` carries the per-member pending figures the client displayed
    /// when the admin confirmed. Balances are recomputed from the
    /// authoritative store inside the same database transaction and compared
    /// against those figures within [`Money::TOLERANCE`]; any divergence (a
    /// concurrent expense, contribution or another settlement) aborts the
    /// whole batch with [`EngineError::StaleSettlement`] and no rows written.
    ///
    /// For each member with an unsettled final balance, exactly one entry is
    /// appended: a debit of the outstanding pending amount (paying the
    /// creditor back), or a credit reclaiming an over-reimbursement when the
    /// pending is negative. Members whose pending is already ~0 need no
    /// entry; their obligation clears once the pool of positive pendings is
    /// empty.
    pub async fn settle_all(
        &self,
        room_id: &str,
        expected: &[(Uuid, Money)],
        user_id: &str,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<SettleOutcome> {
        with_tx!(self, |db_tx| {
            self.require_room_admin(&db_tx, room_id, user_id).await?;

            let snapshot = self.load_room_snapshot(&db_tx, room_id).await?;
            let balances =
                compute_balances(&snapshot.members, &snapshot.expenses, &snapshot.entries);

            let stale = |detail: String| EngineError::StaleSettlement(detail);

            for (member_id, claimed_pending) in expected {
                let fresh = balances
                    .iter()
                    .find(|b| b.member_id == *member_id)
                    .ok_or_else(|| {
                        stale(format!("member {member_id} is no longer in the room"))
                    })?;
                if !fresh.pending.matches(*claimed_pending) {
                    return Err(stale(format!(
                        "pending amount for {} changed from {claimed_pending} to {}, refresh and retry",
                        fresh.email, fresh.pending
                    )));
                }
            }

            let mut appended = Vec::new();
            for balance in &balances {
                if balance.final_balance.is_settled() || balance.pending.is_settled() {
                    continue;
                }
                // Everyone the batch is about to touch must have been part of
                // the confirmed figures.
                if !expected.iter().any(|(id, _)| *id == balance.member_id) {
                    return Err(stale(format!(
                        "member {} was not part of the confirmed settlement",
                        balance.email
                    )));
                }

                let note = Some("settle-all".to_string());
                let entry = if balance.pending.is_positive() {
                    LedgerEntry::debit(
                        room_id.to_string(),
                        balance.member_id,
                        balance.pending,
                        note,
                        created_at,
                        user_id.to_string(),
                    )?
                } else {
                    LedgerEntry::credit(
                        room_id.to_string(),
                        balance.member_id,
                        -balance.pending,
                        note,
                        created_at,
                        user_id.to_string(),
                    )?
                };
                ledger_entries::ActiveModel::from(&entry)
                    .insert(&db_tx)
                    .await?;
                appended.push(entry);
            }

            let mut post_entries = snapshot.entries;
            post_entries.extend(appended.iter().cloned());
            let post_balances =
                compute_balances(&snapshot.members, &snapshot.expenses, &post_entries);

            tracing::info!(
                room_id = %room_id,
                entries = appended.len(),
                "room settled"
            );
            Ok(SettleOutcome {
                entries: appended,
                balances: post_balances,
            })
        })
    }
}
