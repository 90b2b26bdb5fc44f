//! Balance, settlement-plan and batch-settlement endpoints.

use axum::{Extension, Json, extract::State};

use api_types::balance::{
    BalanceGet, BalanceStatus, BalancesResponse, MemberBalanceView, PlanResponse, SettleAll,
    SettleAllResponse, TransferView,
};
use api_types::ledger::EntryView;
use engine::{MemberBalance, Money};

use crate::{ServerError, server::ServerState, user};

fn balance_view(balance: MemberBalance) -> MemberBalanceView {
    MemberBalanceView {
        member_id: balance.member_id,
        email: balance.email,
        display_name: balance.display_name,
        total_expenses_minor: balance.total_expenses.cents(),
        total_contributions_minor: balance.total_contributions.cents(),
        total_settlements_minor: balance.total_settlements.cents(),
        pending_minor: balance.pending.cents(),
        equal_share_minor: balance.equal_share.cents(),
        final_balance_minor: balance.final_balance.cents(),
        status: match balance.status {
            engine::BalanceStatus::Credit => BalanceStatus::Credit,
            engine::BalanceStatus::Debit => BalanceStatus::Debit,
            engine::BalanceStatus::Even => BalanceStatus::Even,
        },
    }
}

pub async fn get_balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BalanceGet>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state
        .engine
        .room_balances(&payload.room_id, &user.username)
        .await?
        .into_iter()
        .map(balance_view)
        .collect();

    Ok(Json(BalancesResponse { balances }))
}

pub async fn get_plan(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BalanceGet>,
) -> Result<Json<PlanResponse>, ServerError> {
    let transfers = state
        .engine
        .settlement_plan(&payload.room_id, &user.username)
        .await?
        .into_iter()
        .map(|transfer| TransferView {
            from: transfer.from,
            to: transfer.to,
            amount_minor: transfer.amount.cents(),
        })
        .collect();

    Ok(Json(PlanResponse { transfers }))
}

pub async fn settle_all(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SettleAll>,
) -> Result<Json<SettleAllResponse>, ServerError> {
    let expected: Vec<_> = payload
        .expected
        .iter()
        .map(|e| (e.member_id, Money::new(e.pending_minor)))
        .collect();

    let outcome = state
        .engine
        .settle_all(
            &payload.room_id,
            &expected,
            &user.username,
            payload.created_at,
        )
        .await?;

    Ok(Json(SettleAllResponse {
        entries: outcome
            .entries
            .into_iter()
            .map(|entry| EntryView {
                id: entry.id,
                member_id: entry.member_id,
                amount_minor: entry.amount.cents(),
                kind: entry.kind.as_str().to_string(),
                note: entry.note,
                created_at: entry.created_at,
            })
            .collect(),
        balances: outcome.balances.into_iter().map(balance_view).collect(),
    }))
}
