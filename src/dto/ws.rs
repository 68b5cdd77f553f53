//! WebSocket wire protocol: the `{ type, payload }` envelope in both
//! directions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::room::{Player, RoomSnapshot, RoundResultsPayload};

/// Messages accepted from player WebSocket clients.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on every connection; establishes the player.
    JoinRoom {
        /// Display name; rejected when empty after trimming.
        name: String,
    },
    /// Host-only request to start the next round.
    StartGame {},
    /// Answer submission for the current round.
    SubmitAnswer {
        /// Id of the selected option.
        #[serde(rename = "optionId")]
        option_id: String,
    },
    /// Any unrecognized message type.
    #[serde(other)]
    Unknown,
}

/// Messages pushed to player WebSocket clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A player joined the room.
    PlayerJoined(Player),
    /// Full room snapshot after any state change.
    RoomState(RoomSnapshot),
    /// End-of-round scoring report.
    RoundResults(RoundResultsPayload),
    /// Final leaderboard once the round limit is reached.
    GameOver(GameOverPayload),
    /// Acknowledgement of a recorded answer.
    AnswerAccepted(AnswerAccepted),
    /// A request failed; sent only to the requesting client, except during
    /// auto-advance where the whole room is informed of the stall.
    Error(ErrorPayload),
}

/// Positive acknowledgement sent after an answer is recorded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerAccepted {
    /// Always `true`.
    pub ok: bool,
}

/// Error envelope payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorPayload {
    /// Human-readable failure description.
    pub message: String,
}

impl ErrorPayload {
    /// Wrap a failure description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One row of the final leaderboard.
///
/// Places use competition ranking: tied scores share a place and the next
/// distinct score resumes at `previous place + tie group size`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based place, shared between tied players.
    pub place: u32,
    /// Player id.
    pub player_id: Uuid,
    /// Display name.
    pub name: String,
    /// Final cumulative score.
    pub score: u32,
}

/// Final report broadcast when a game reaches its round limit.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameOverPayload {
    /// Room code.
    pub code: String,
    /// Number of rounds that were played.
    pub rounds_played: u32,
    /// Players ranked by descending score, ties broken by ascending name.
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_parses_from_the_wire_envelope() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"join_room","payload":{"name":"Ada"}}"#).unwrap();
        assert!(matches!(message, ClientMessage::JoinRoom { name } if name == "Ada"));
    }

    #[test]
    fn submit_answer_uses_camel_case_option_id() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"submit_answer","payload":{"optionId":"B"}}"#)
                .unwrap();
        assert!(matches!(message, ClientMessage::SubmitAnswer { option_id } if option_id == "B"));
    }

    #[test]
    fn start_game_accepts_an_empty_payload() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"start_game","payload":{}}"#).unwrap();
        assert!(matches!(message, ClientMessage::StartGame {}));
    }

    #[test]
    fn unrecognized_types_map_to_unknown() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"reboot","payload":{}}"#).unwrap();
        assert!(matches!(message, ClientMessage::Unknown));
    }

    #[test]
    fn server_messages_carry_the_tagged_envelope() {
        let encoded = serde_json::to_value(ServerMessage::Error(ErrorPayload::new("nope")))
            .unwrap();
        assert_eq!(encoded["type"], "error");
        assert_eq!(encoded["payload"]["message"], "nope");
    }
}
