use axum::{
    Router,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tracing::info;

use crate::{error::AppError, services::websocket_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/ws/{code}",
    tag = "ws",
    params(("code" = String, Path, description = "Room code to join")),
    responses(
        (status = 101, description = "Switching protocols to WebSocket"),
        (status = 404, description = "Room not found")
    )
)]
/// Upgrade the HTTP connection into a player WebSocket session.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let room = state
        .rooms()
        .get_room(&code)
        .ok_or_else(|| AppError::NotFound(format!("room `{code}` not found")))?;

    info!(room = room.code(), "ws connect attempt");
    Ok(ws.on_upgrade(move |socket| websocket_service::handle_socket(state, socket, room)))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws/{code}", get(ws_handler))
}
