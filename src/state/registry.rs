//! Connection registry: tracks which live WebSocket connections belong to
//! which room and fans broadcasts out to them.
//!
//! A single event-loop task owns the room → connections map; registration,
//! unregistration, and broadcasts all flow through one command channel, so
//! the map needs no cross-task locking. Slow consumers are shed: a broadcast
//! never blocks on a full outbound queue, it schedules that connection's
//! unregistration instead.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{Notify, mpsc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dto::ws::ServerMessage;

/// Capacity of each connection's outbound queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Handle used to push messages to one connected player.
#[derive(Clone)]
pub struct ClientConnection {
    /// Upper-cased code of the room the connection joined.
    pub room_code: String,
    /// Player the connection belongs to.
    pub player_id: Uuid,
    /// Bounded outbound queue drained by the connection's writer task.
    pub tx: mpsc::Sender<Message>,
    /// Signalled when the registry sheds the connection; the socket task
    /// observes it and tears the connection down.
    pub cancel: Arc<Notify>,
}

enum RegistryCommand {
    Register(ClientConnection),
    Unregister { room_code: String, player_id: Uuid },
    Broadcast { room_code: String, data: String },
}

/// Cloneable handle to the registry event loop.
///
/// Also owns the per-room round-generation counters, the cancellation
/// primitive for scheduled round work: a task captures the generation at
/// spawn time and checks it on wake; a mismatch means a newer round
/// superseded it and the task must produce no side effects.
#[derive(Clone)]
pub struct ConnectionRegistry {
    commands: mpsc::UnboundedSender<RegistryCommand>,
    generations: Arc<DashMap<String, u64>>,
}

impl ConnectionRegistry {
    /// Spawn the event loop and return a handle to it.
    pub fn spawn() -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run(receiver));
        Self {
            commands,
            generations: Arc::new(DashMap::new()),
        }
    }

    /// Add a connection to its room's active set.
    ///
    /// A later registration for the same player id in the same room replaces
    /// the earlier entry's slot without closing the earlier connection.
    pub fn register(&self, connection: ClientConnection) {
        let _ = self.commands.send(RegistryCommand::Register(connection));
    }

    /// Remove a player's registry slot; the last removal in a room drops the
    /// room's registry entry (the room itself persists in the manager).
    pub fn unregister(&self, room_code: &str, player_id: Uuid) {
        let _ = self.commands.send(RegistryCommand::Unregister {
            room_code: room_code.to_string(),
            player_id,
        });
    }

    /// Serialize a message once and enqueue it to every connection in the
    /// room without blocking.
    pub fn broadcast(&self, room_code: &str, message: &ServerMessage) {
        let data = match serde_json::to_string(message) {
            Ok(data) => data,
            Err(err) => {
                error!(error = %err, "broadcast serialization failed");
                return;
            }
        };
        let _ = self.commands.send(RegistryCommand::Broadcast {
            room_code: room_code.to_string(),
            data,
        });
    }

    /// Increment and return the room's round generation.
    pub fn bump_generation(&self, room_code: &str) -> u64 {
        let mut entry = self
            .generations
            .entry(room_code.to_uppercase())
            .or_insert(0);
        *entry += 1;
        *entry
    }

    /// Whether a captured generation is still the room's current one.
    pub fn is_current_generation(&self, room_code: &str, generation: u64) -> bool {
        self.generations
            .get(&room_code.to_uppercase())
            .map(|entry| *entry.value())
            .unwrap_or(0)
            == generation
    }
}

/// The single-owner event loop; exclusively mutates the registry map.
async fn run(mut commands: mpsc::UnboundedReceiver<RegistryCommand>) {
    let mut rooms: HashMap<String, HashMap<Uuid, ClientConnection>> = HashMap::new();

    while let Some(command) = commands.recv().await {
        match command {
            RegistryCommand::Register(connection) => {
                let room_code = connection.room_code.to_uppercase();
                info!(room = %room_code, player_id = %connection.player_id, "client registered");
                rooms
                    .entry(room_code)
                    .or_default()
                    .insert(connection.player_id, connection);
            }
            RegistryCommand::Unregister {
                room_code,
                player_id,
            } => {
                let room_code = room_code.to_uppercase();
                if let Some(clients) = rooms.get_mut(&room_code) {
                    clients.remove(&player_id);
                    if clients.is_empty() {
                        rooms.remove(&room_code);
                    }
                }
                info!(room = %room_code, player_id = %player_id, "client unregistered");
            }
            RegistryCommand::Broadcast { room_code, data } => {
                let room_code = room_code.to_uppercase();
                let Some(clients) = rooms.get_mut(&room_code) else {
                    continue;
                };

                let mut shed = Vec::new();
                for (player_id, connection) in clients.iter() {
                    if connection
                        .tx
                        .try_send(Message::Text(data.clone().into()))
                        .is_err()
                    {
                        warn!(
                            room = %room_code,
                            player_id = %player_id,
                            "outbound queue full or closed; shedding slow consumer"
                        );
                        shed.push(*player_id);
                    }
                }

                for player_id in shed {
                    if let Some(connection) = clients.remove(&player_id) {
                        connection.cancel.notify_one();
                    }
                }
                if clients.is_empty() {
                    rooms.remove(&room_code);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::dto::ws::ErrorPayload;

    fn connection(
        room_code: &str,
        capacity: usize,
    ) -> (ClientConnection, mpsc::Receiver<Message>, Uuid) {
        let (tx, rx) = mpsc::channel(capacity);
        let player_id = Uuid::new_v4();
        let handle = ClientConnection {
            room_code: room_code.to_string(),
            player_id,
            tx,
            cancel: Arc::new(Notify::new()),
        };
        (handle, rx, player_id)
    }

    fn message(text: &str) -> ServerMessage {
        ServerMessage::Error(ErrorPayload::new(text))
    }

    async fn recv_text(rx: &mut mpsc::Receiver<Message>) -> String {
        let received = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("broadcast delivered")
            .expect("channel open");
        match received {
            Message::Text(text) => text.to_string(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_registered_connection() {
        let registry = ConnectionRegistry::spawn();
        let (first, mut first_rx, _) = connection("ABCD", 8);
        let (second, mut second_rx, _) = connection("abcd", 8);
        registry.register(first);
        registry.register(second);

        registry.broadcast("ABCD", &message("hello"));

        assert!(recv_text(&mut first_rx).await.contains("hello"));
        assert!(recv_text(&mut second_rx).await.contains("hello"));
    }

    #[tokio::test]
    async fn unregistered_connections_stop_receiving() {
        let registry = ConnectionRegistry::spawn();
        let (first, mut first_rx, first_id) = connection("ABCD", 8);
        let (second, mut second_rx, _) = connection("ABCD", 8);
        // The socket task keeps its own sender; mirror that so the channel
        // outlives the registry's copy.
        let _first_writer = first.tx.clone();
        registry.register(first);
        registry.register(second);

        registry.unregister("ABCD", first_id);
        registry.broadcast("ABCD", &message("after"));

        assert!(recv_text(&mut second_rx).await.contains("after"));
        assert!(
            timeout(Duration::from_millis(100), first_rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn slow_consumers_are_shed_without_blocking_the_room() {
        let registry = ConnectionRegistry::spawn();
        let (fast, mut fast_rx, _) = connection("ABCD", 8);
        let (slow, mut slow_rx, _) = connection("ABCD", 1);
        let slow_cancel = Arc::clone(&slow.cancel);
        let _slow_writer = slow.tx.clone();
        registry.register(fast);
        registry.register(slow);

        // First broadcast fills the slow queue; the second overflows it.
        registry.broadcast("ABCD", &message("one"));
        registry.broadcast("ABCD", &message("two"));

        assert!(recv_text(&mut fast_rx).await.contains("one"));
        assert!(recv_text(&mut fast_rx).await.contains("two"));

        timeout(Duration::from_secs(1), slow_cancel.notified())
            .await
            .expect("shed connection is cancelled");

        // The slow consumer kept its first message but was dropped from the
        // room before the second.
        assert!(recv_text(&mut slow_rx).await.contains("one"));
        registry.broadcast("ABCD", &message("three"));
        assert!(recv_text(&mut fast_rx).await.contains("three"));
        assert!(
            timeout(Duration::from_millis(100), slow_rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn reregistration_replaces_the_slot_without_closing_the_old_queue() {
        let registry = ConnectionRegistry::spawn();
        let (old, mut old_rx, player_id) = connection("ABCD", 8);
        let (new_tx, mut new_rx) = mpsc::channel(8);
        let replacement = ClientConnection {
            room_code: "ABCD".into(),
            player_id,
            tx: new_tx,
            cancel: Arc::new(Notify::new()),
        };
        let old_writer = old.tx.clone();
        let old_cancel = Arc::clone(&old.cancel);
        registry.register(old);
        registry.register(replacement);

        registry.broadcast("ABCD", &message("fresh"));

        let received = timeout(Duration::from_secs(1), new_rx.recv())
            .await
            .expect("replacement receives")
            .expect("channel open");
        assert!(matches!(received, Message::Text(text) if text.contains("fresh")));

        // The replaced connection is neither closed nor cancelled, merely
        // silent: it lost its registry slot.
        assert!(!old_writer.is_closed());
        assert!(
            timeout(Duration::from_millis(100), old_cancel.notified())
                .await
                .is_err()
        );
        assert!(
            timeout(Duration::from_millis(100), old_rx.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn generations_detect_superseded_rounds() {
        let registry = ConnectionRegistry::spawn();

        let first = registry.bump_generation("ABCD");
        assert_eq!(first, 1);
        assert!(registry.is_current_generation("ABCD", first));
        assert!(registry.is_current_generation("abcd", first));

        let second = registry.bump_generation("ABCD");
        assert_eq!(second, 2);
        assert!(!registry.is_current_generation("ABCD", first));
        assert!(registry.is_current_generation("ABCD", second));

        // Rooms that never started a round sit at generation zero.
        assert!(registry.is_current_generation("WXYZ", 0));
    }
}
