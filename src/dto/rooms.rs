//! DTO definitions for the room creation and lookup endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::room::Phase;

/// Response returned when a room is created.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomCreatedResponse {
    /// The new room's join code.
    pub code: String,
}

/// Lightweight room probe returned by the lookup endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomInfoResponse {
    /// Room code.
    pub code: String,
    /// Current phase.
    pub phase: Phase,
}
