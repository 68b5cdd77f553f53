use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use tracing::info;

use crate::{
    dto::rooms::{RoomCreatedResponse, RoomInfoResponse},
    error::AppError,
    state::SharedState,
};

#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    responses((status = 200, description = "Room created", body = RoomCreatedResponse))
)]
/// Create an empty room and return its join code.
pub async fn create_room(State(state): State<SharedState>) -> Json<RoomCreatedResponse> {
    let room = state.rooms().create_room();
    info!(code = room.code(), "room created");
    Json(RoomCreatedResponse {
        code: room.code().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "Room code, case-insensitive")),
    responses(
        (status = 200, description = "Room info", body = RoomInfoResponse),
        (status = 404, description = "Room not found")
    )
)]
/// Look up a room by code and report its phase.
pub async fn room_info(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomInfoResponse>, AppError> {
    let room = state
        .rooms()
        .get_room(&code)
        .ok_or_else(|| AppError::NotFound(format!("room `{code}` not found")))?;

    let snapshot = room.snapshot();
    Ok(Json(RoomInfoResponse {
        code: snapshot.code,
        phase: snapshot.phase,
    }))
}

/// Configure the room routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(room_info))
}
