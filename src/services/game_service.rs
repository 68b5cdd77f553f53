//! Round orchestration helpers shared by the WebSocket layer and the
//! round scheduler.

use std::sync::Arc;

use crate::dto::ws::{GameOverPayload, LeaderboardEntry};
use crate::error::ServiceError;
use crate::state::SharedState;
use crate::state::room::Room;
use uuid::Uuid;

/// Fetch a random active question and start the room's next round with it.
///
/// Fails with [`ServiceError::NoQuestions`] when the bank has nothing active
/// and with the room's own validation errors otherwise.
pub async fn start_round(
    state: &SharedState,
    room: &Arc<Room>,
    host_id: Uuid,
) -> Result<(), ServiceError> {
    let question = state
        .questions()
        .random_active()
        .await?
        .ok_or(ServiceError::NoQuestions)?;

    room.start_game(host_id, question, state.config().answering)?;
    Ok(())
}

/// Build the final leaderboard from the room's current scores.
///
/// Players rank by descending score with ties broken by ascending name.
/// Places use competition ranking: tied scores share a place number and the
/// next distinct score resumes at `previous place + tie group size`.
pub fn build_leaderboard(room: &Room) -> GameOverPayload {
    let snapshot = room.snapshot();

    let mut rows: Vec<(Uuid, String, u32)> = snapshot
        .players
        .iter()
        .map(|player| {
            let score = snapshot.scores.get(&player.id).copied().unwrap_or(0);
            (player.id, player.name.clone(), score)
        })
        .collect();
    rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)));

    let mut leaderboard = Vec::with_capacity(rows.len());
    let mut place = 0u32;
    let mut previous_score = None;
    for (index, (player_id, name, score)) in rows.into_iter().enumerate() {
        if previous_score != Some(score) {
            place = index as u32 + 1;
            previous_score = Some(score);
        }
        leaderboard.push(LeaderboardEntry {
            place,
            player_id,
            name,
            score,
        });
    }

    GameOverPayload {
        code: snapshot.code,
        rounds_played: snapshot.round_number,
        leaderboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use crate::state::room::{Player, Question, QuestionOption};

    fn player(name: &str) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    fn question(correct: &str) -> Question {
        Question {
            text: "Q?".into(),
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|id| QuestionOption {
                    id: (*id).into(),
                    text: (*id).into(),
                })
                .collect(),
            correct_id: correct.into(),
        }
    }

    fn play_round(room: &Room, host: Uuid, answers: &[(Uuid, &str)]) {
        room.start_game(host, question("B"), Duration::from_secs(30))
            .unwrap();
        for (player_id, option) in answers {
            room.submit_answer(*player_id, option).unwrap();
        }
        room.force_deadline(Some(SystemTime::now() - Duration::from_secs(1)));
        room.finish_round_if_deadline_passed().unwrap();
    }

    #[test]
    fn leaderboard_uses_competition_ranking() {
        let room = Room::new("ABCD");
        let alice = player("Alice");
        let bob = player("Bob");
        let carol = player("Carol");
        room.add_player(alice.clone());
        room.add_player(bob.clone());
        room.add_player(carol.clone());

        // Alice and Bob answer correctly twice, Carol once.
        play_round(
            &room,
            alice.id,
            &[(alice.id, "B"), (bob.id, "B"), (carol.id, "B")],
        );
        play_round(&room, alice.id, &[(alice.id, "B"), (bob.id, "B"), (carol.id, "A")]);

        let payload = build_leaderboard(&room);
        assert_eq!(payload.rounds_played, 2);

        let places: Vec<(u32, &str, u32)> = payload
            .leaderboard
            .iter()
            .map(|entry| (entry.place, entry.name.as_str(), entry.score))
            .collect();
        assert_eq!(
            places,
            vec![(1, "Alice", 2), (1, "Bob", 2), (3, "Carol", 1)]
        );
    }

    #[test]
    fn leaderboard_breaks_ties_by_ascending_name() {
        let room = Room::new("ABCD");
        let zoe = player("Zoe");
        let amy = player("Amy");
        room.add_player(zoe.clone());
        room.add_player(amy.clone());

        let payload = build_leaderboard(&room);
        let names: Vec<&str> = payload
            .leaderboard
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["Amy", "Zoe"]);
        assert!(payload.leaderboard.iter().all(|entry| entry.place == 1));
    }
}
