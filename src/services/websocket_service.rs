//! Per-connection WebSocket lifecycle: join handshake, inbound dispatch,
//! and the dedicated writer task.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::ws::{AnswerAccepted, ClientMessage, ErrorPayload, ServerMessage};
use crate::services::{game_service, round_scheduler};
use crate::state::room::{Player, Room};
use crate::state::{ClientConnection, OUTBOUND_QUEUE_CAPACITY, SharedState};

/// How long a fresh connection gets to send its `join_room` message.
const JOIN_TIMEOUT: Duration = Duration::from_secs(15);
/// Interval between liveness pings emitted by the writer task.
const PING_PERIOD: Duration = Duration::from_secs(30);
/// Upper bound on a single outbound write.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle the full lifecycle of one player WebSocket connection.
///
/// The reader half of this function is the only code path that removes a
/// player from their room.
pub async fn handle_socket(state: SharedState, socket: WebSocket, room: Arc<Room>) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_queue) = mpsc::channel::<Message>(OUTBOUND_QUEUE_CAPACITY);

    // Dedicated writer task: drains the outbound queue and keeps the
    // connection alive with periodic pings, each write bounded in time.
    let writer_task = tokio::spawn(async move {
        let mut ping = interval(PING_PERIOD);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ping.reset();
        loop {
            let message = tokio::select! {
                queued = outbound_queue.recv() => match queued {
                    Some(message) => message,
                    None => break,
                },
                _ = ping.tick() => Message::Ping(Vec::new().into()),
            };
            match timeout(WRITE_TIMEOUT, sender.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(error = %err, "websocket write failed");
                    break;
                }
                Err(_) => {
                    warn!("websocket write timed out");
                    break;
                }
            }
        }
    });

    let first_message = match timeout(JOIN_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.try_send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(room = room.code(), error = %err, "websocket receive error before join");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!(room = room.code(), "join handshake timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let name = match serde_json::from_str::<ClientMessage>(&first_message) {
        Ok(ClientMessage::JoinRoom { name }) => name.trim().to_string(),
        _ => {
            send_direct(
                &outbound_tx,
                &ServerMessage::Error(ErrorPayload::new("expected join_room")),
            );
            let _ = outbound_tx.try_send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };
    if name.is_empty() {
        send_direct(
            &outbound_tx,
            &ServerMessage::Error(ErrorPayload::new("invalid name")),
        );
        let _ = outbound_tx.try_send(Message::Close(None));
        finalize(writer_task, outbound_tx).await;
        return;
    }

    let player = Player {
        id: Uuid::new_v4(),
        name,
    };
    let player_id = player.id;
    let is_host = room.add_player(player.clone());
    info!(
        room = room.code(),
        player_id = %player_id,
        is_host,
        "player joined"
    );

    let cancel = Arc::new(Notify::new());
    state.registry().register(ClientConnection {
        room_code: room.code().to_string(),
        player_id,
        tx: outbound_tx.clone(),
        cancel: Arc::clone(&cancel),
    });

    state
        .registry()
        .broadcast(room.code(), &ServerMessage::PlayerJoined(player));
    state
        .registry()
        .broadcast(room.code(), &ServerMessage::RoomState(room.snapshot()));

    loop {
        let next = tokio::select! {
            next = receiver.next() => next,
            _ = cancel.notified() => {
                info!(room = room.code(), player_id = %player_id, "connection shed by registry");
                break;
            }
        };
        let Some(next) = next else { break };

        match next {
            Ok(Message::Text(text)) => {
                let dispatched = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => dispatch(&state, &room, player_id, message, &outbound_tx).await,
                    Err(err) => {
                        warn!(
                            room = room.code(),
                            player_id = %player_id,
                            error = %err,
                            "failed to parse client message"
                        );
                        send_direct(
                            &outbound_tx,
                            &ServerMessage::Error(ErrorPayload::new("bad payload")),
                        )
                    }
                };
                if !dispatched {
                    break;
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.try_send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => {
                info!(room = room.code(), player_id = %player_id, "client closed");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(room = room.code(), player_id = %player_id, error = %err, "websocket error");
                break;
            }
        }
    }

    // The only path that removes a player: disconnection (or shedding).
    room.remove_player(player_id);
    state
        .registry()
        .broadcast(room.code(), &ServerMessage::RoomState(room.snapshot()));
    state.registry().unregister(room.code(), player_id);
    info!(room = room.code(), player_id = %player_id, "connection closed");

    finalize(writer_task, outbound_tx).await;
}

/// Handle one parsed client message. Returns `false` when the connection
/// should be torn down because its outbound queue is gone.
async fn dispatch(
    state: &SharedState,
    room: &Arc<Room>,
    player_id: Uuid,
    message: ClientMessage,
    outbound_tx: &mpsc::Sender<Message>,
) -> bool {
    match message {
        ClientMessage::StartGame {} => {
            // An explicit start at the round limit yields the leaderboard
            // rather than an error, mirroring the scheduler's end check.
            if room.snapshot().round_number >= state.config().max_rounds {
                let game_over = game_service::build_leaderboard(room);
                return send_direct(outbound_tx, &ServerMessage::GameOver(game_over));
            }

            match game_service::start_round(state, room, player_id).await {
                Ok(()) => {
                    state
                        .registry()
                        .broadcast(room.code(), &ServerMessage::RoomState(room.snapshot()));
                    let generation = state.registry().bump_generation(room.code());
                    round_scheduler::spawn_answering_deadline(
                        Arc::clone(state),
                        Arc::clone(room),
                        generation,
                    );
                    true
                }
                Err(err) => {
                    warn!(room = room.code(), player_id = %player_id, error = %err, "start_game failed");
                    send_direct(
                        outbound_tx,
                        &ServerMessage::Error(ErrorPayload::new(err.to_string())),
                    )
                }
            }
        }
        ClientMessage::SubmitAnswer { option_id } => {
            match room.submit_answer(player_id, &option_id) {
                Ok(()) => send_direct(
                    outbound_tx,
                    &ServerMessage::AnswerAccepted(AnswerAccepted { ok: true }),
                ),
                Err(err) => {
                    warn!(
                        room = room.code(),
                        player_id = %player_id,
                        option_id = %option_id,
                        error = %err,
                        "submit_answer rejected"
                    );
                    send_direct(
                        outbound_tx,
                        &ServerMessage::Error(ErrorPayload::new(err.to_string())),
                    )
                }
            }
        }
        ClientMessage::JoinRoom { .. } => send_direct(
            outbound_tx,
            &ServerMessage::Error(ErrorPayload::new("already joined")),
        ),
        ClientMessage::Unknown => {
            warn!(room = room.code(), player_id = %player_id, "unknown message type");
            send_direct(
                outbound_tx,
                &ServerMessage::Error(ErrorPayload::new("unknown message type")),
            )
        }
    }
}

/// Serialize a payload and push it onto this connection's outbound queue.
///
/// Returns `false` when the queue is full or closed, in which case the
/// caller tears the connection down rather than blocking.
fn send_direct(outbound_tx: &mpsc::Sender<Message>, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(payload) => outbound_tx.try_send(Message::Text(payload.into())).is_ok(),
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound message");
            true
        }
    }
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::Sender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
