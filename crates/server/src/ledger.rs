//! Ledger endpoints: contributions, manual settlements, listing.

use axum::{Extension, Json, extract::State, http::StatusCode};

use api_types::ledger::{EntriesResponse, EntryCreated, EntryList, EntryNew, EntryView};
use engine::Money;

use crate::{ServerError, server::ServerState, user};

pub async fn contribution_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let id = state
        .engine
        .record_contribution(
            &payload.room_id,
            payload.member_id,
            Money::new(payload.amount_minor),
            payload.note.as_deref(),
            &user.username,
            payload.created_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EntryCreated { id })))
}

pub async fn payout_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let id = state
        .engine
        .record_settlement_payout(
            &payload.room_id,
            payload.member_id,
            Money::new(payload.amount_minor),
            payload.note.as_deref(),
            &user.username,
            payload.created_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EntryCreated { id })))
}

pub async fn collection_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let id = state
        .engine
        .record_settlement_collection(
            &payload.room_id,
            payload.member_id,
            Money::new(payload.amount_minor),
            payload.note.as_deref(),
            &user.username,
            payload.created_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EntryCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryList>,
) -> Result<Json<EntriesResponse>, ServerError> {
    let entries = state
        .engine
        .list_ledger_entries(&payload.room_id, &user.username)
        .await?
        .into_iter()
        .map(|entry| EntryView {
            id: entry.id,
            member_id: entry.member_id,
            amount_minor: entry.amount.cents(),
            kind: entry.kind.as_str().to_string(),
            note: entry.note,
            created_at: entry.created_at,
        })
        .collect();

    Ok(Json(EntriesResponse { entries }))
}
