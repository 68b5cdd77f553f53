//! Deadline-driven round progression.
//!
//! Two cooperating task kinds drive a room once a round starts: one sleeps
//! until the answering deadline and finalizes the round, the other sleeps
//! through the results pause and auto-starts the next round. Both capture
//! the room's generation at spawn time; a stale generation on wake means a
//! newer round superseded the task and it exits with no side effects.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::dto::ws::{ErrorPayload, ServerMessage};
use crate::services::game_service;
use crate::state::SharedState;
use crate::state::room::Room;

/// Spawn the task that finalizes the current round at its deadline.
///
/// `generation` must be captured via `bump_generation` immediately after the
/// state transition that opened the round.
pub fn spawn_answering_deadline(state: SharedState, room: Arc<Room>, generation: u64) {
    tokio::spawn(schedule_answering_deadline(state, room, generation));
}

/// Spawn the task that auto-starts the next round after the results pause.
pub fn spawn_next_round(state: SharedState, room: Arc<Room>, pause: Duration) {
    tokio::spawn(schedule_next_round(state, room, pause));
}

async fn schedule_answering_deadline(state: SharedState, room: Arc<Room>, generation: u64) {
    let Some(deadline_millis) = room.snapshot().deadline else {
        return;
    };
    let deadline = UNIX_EPOCH + Duration::from_millis(deadline_millis);
    let wait = deadline
        .duration_since(SystemTime::now())
        .unwrap_or(Duration::ZERO);
    sleep(wait).await;

    // A newer round superseded this task while it slept.
    if !state.registry().is_current_generation(room.code(), generation) {
        info!(room = room.code(), generation, "skipping stale deadline task");
        return;
    }

    let Some(payload) = room.finish_round_if_deadline_passed() else {
        return;
    };

    let registry = state.registry();
    registry.broadcast(room.code(), &ServerMessage::RoundResults(payload));
    registry.broadcast(room.code(), &ServerMessage::RoomState(room.snapshot()));

    if room.snapshot().round_number >= state.config().max_rounds {
        let game_over = game_service::build_leaderboard(&room);
        registry.broadcast(room.code(), &ServerMessage::GameOver(game_over));
        return;
    }

    let pause = state.config().results_pause;
    spawn_next_round(state, room, pause);
}

async fn schedule_next_round(state: SharedState, room: Arc<Room>, pause: Duration) {
    sleep(pause).await;

    let snapshot = room.snapshot();
    let Some(host_id) = snapshot.host_id else {
        // Everybody left during the pause; let the room idle in results.
        info!(room = room.code(), "abandoning auto-advance for empty room");
        return;
    };

    let registry = state.registry();
    if snapshot.round_number >= state.config().max_rounds {
        let game_over = game_service::build_leaderboard(&room);
        registry.broadcast(room.code(), &ServerMessage::GameOver(game_over));
        return;
    }

    if let Err(err) = game_service::start_round(&state, &room, host_id).await {
        warn!(room = room.code(), error = %err, "auto-advance failed; stalling room");
        registry.broadcast(
            room.code(),
            &ServerMessage::Error(ErrorPayload::new(err.to_string())),
        );
        return;
    }

    registry.broadcast(room.code(), &ServerMessage::RoomState(room.snapshot()));

    let generation = registry.bump_generation(room.code());
    spawn_answering_deadline(state, room, generation);
}
