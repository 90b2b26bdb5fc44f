//! Room API endpoints

use api_types::room::{RoomGet, RoomNew, RoomView, RoomsResponse};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

/// Handle requests for creating a new room. The caller becomes its first
/// admin member; the username doubles as email/display name until edited.
pub async fn room_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RoomNew>,
) -> Result<Json<RoomView>, ServerError> {
    let email = if user.username.contains('@') {
        user.username.clone()
    } else {
        format!("{}@local", user.username)
    };
    let room_id = state
        .engine
        .new_room(&payload.name, &email, &user.username, &user.username)
        .await?;

    Ok(Json(RoomView {
        id: room_id,
        name: payload.name,
    }))
}

/// Handle requests for fetching a single room, by id or by name.
pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RoomGet>,
) -> Result<Json<RoomView>, ServerError> {
    let room = match (payload.id, payload.name) {
        (Some(id), _) => state.engine.room(&id, &user.username).await?,
        (None, Some(name)) => state.engine.room_by_name(&name, &user.username).await?,
        (None, None) => return Err(ServerError::Generic("id or name required".to_string())),
    };

    Ok(Json(RoomView {
        id: room.id,
        name: room.name,
    }))
}

/// Handle requests for listing the caller's rooms.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<RoomsResponse>, ServerError> {
    let rooms = state
        .engine
        .list_rooms(&user.username)
        .await?
        .into_iter()
        .map(|room| RoomView {
            id: room.id,
            name: room.name,
        })
        .collect();

    Ok(Json(RoomsResponse { rooms }))
}
