//! Member management endpoints (admin-only mutations).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::member::{MemberNew, MemberRoleUpdate, MemberView, MembersResponse};

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(room_id): Path<String>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_members(&room_id, &user.username)
        .await?
        .into_iter()
        .map(|member| MemberView {
            id: member.id,
            email: member.email,
            display_name: member.display_name,
            is_admin: member.is_admin,
        })
        .collect();

    Ok(Json(MembersResponse { members }))
}

pub async fn add(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(room_id): Path<String>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let member_id = state
        .engine
        .add_member(
            &room_id,
            &payload.email,
            &payload.display_name,
            payload.user_id.as_deref(),
            payload.is_admin.unwrap_or(false),
            &user.username,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MemberView {
            id: member_id,
            email: payload.email,
            display_name: payload.display_name,
            is_admin: payload.is_admin.unwrap_or(false),
        }),
    ))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((room_id, member_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_member(&room_id, member_id, &user.username, chrono::Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((room_id, member_id)): Path<(String, Uuid)>,
    Json(payload): Json<MemberRoleUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_member_admin(&room_id, member_id, payload.is_admin, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
