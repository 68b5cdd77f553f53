//! Per-room game state machine: lobby → answering → results transitions and
//! the answer/score bookkeeping that goes with them.
//!
//! Every mutating operation takes the room's own lock for the duration of the
//! call only, so operations are atomic with respect to concurrent submissions
//! and concurrent deadline checks, and the lock is never held across an await.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::GameError;

/// Number of options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// The room's current stage, governing which operations are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for players; no round has started or the game was reset.
    Lobby,
    /// A question is live and the answering deadline is ticking.
    Answering,
    /// The last round was scored; waiting for the next round or game over.
    Results,
}

/// A participant in a room, created at join time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Player {
    /// Opaque identifier generated when the player joins.
    pub id: Uuid,
    /// Display name supplied in the join message.
    pub name: String,
}

/// One of the four labeled answer options of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOption {
    /// Short identifier the client submits back.
    pub id: String,
    /// Display text shown to players.
    pub text: String,
}

/// A question selected for a round. Immutable once a round starts.
///
/// The correct option id never leaves the server through a snapshot; it is
/// only revealed in the round results payload.
#[derive(Debug, Clone)]
pub struct Question {
    /// Prompt text.
    pub text: String,
    /// Exactly four labeled options.
    pub options: Vec<QuestionOption>,
    /// Id of the correct option; must match one of `options`.
    pub correct_id: String,
}

impl Question {
    fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}

/// Immutable point-in-time projection of a room's externally visible state.
///
/// Taken under the room lock at a single instant; every collection is an
/// independent copy, so mutating a snapshot never touches the room.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room code.
    pub code: String,
    /// Current phase.
    pub phase: Phase,
    /// Current host, if the room is non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<Uuid>,
    /// Rounds started so far.
    pub round_number: u32,
    /// Prompt of the current question; present in answering and results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// Options of the current question; present in answering and results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    /// Answering deadline as unix milliseconds; present only while answering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,
    /// Players in join order.
    pub players: Vec<Player>,
    /// Cumulative correct-answer counts per player.
    pub scores: HashMap<Uuid, u32>,
}

/// One player's line in a round results payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    /// Player id.
    pub player_id: Uuid,
    /// Display name.
    pub name: String,
    /// Option the player picked, absent when they never answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<String>,
    /// Whether the selected option was the correct one.
    pub correct: bool,
    /// Running score after this round.
    pub score: u32,
}

/// End-of-round report broadcast to the whole room.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundResultsPayload {
    /// Room code.
    pub code: String,
    /// Round that just finished.
    pub round_number: u32,
    /// Prompt of the finished round's question.
    pub question: String,
    /// Options of the finished round's question.
    pub options: Vec<QuestionOption>,
    /// The correct option, revealed now that the round is scored.
    pub correct_option_id: String,
    /// Per-player outcome in join order.
    pub results: Vec<RoundResult>,
}

/// Mutable state guarded by the room lock.
#[derive(Debug)]
struct RoomInner {
    phase: Phase,
    players: IndexMap<Uuid, Player>,
    host_id: Option<Uuid>,
    round_number: u32,
    current_question: Option<Question>,
    answering_deadline: Option<SystemTime>,
    answers: HashMap<Uuid, String>,
    scores: HashMap<Uuid, u32>,
}

/// One isolated game instance identified by a short code.
///
/// Rooms are created empty in the lobby phase and are mutated exclusively
/// through the operations below. Abandoned rooms persist for the process
/// lifetime; there is no explicit destruction.
#[derive(Debug)]
pub struct Room {
    code: String,
    inner: Mutex<RoomInner>,
}

impl Room {
    /// Create an empty room in the lobby phase.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            inner: Mutex::new(RoomInner {
                phase: Phase::Lobby,
                players: IndexMap::new(),
                host_id: None,
                round_number: 0,
                current_question: None,
                answering_deadline: None,
                answers: HashMap::new(),
                scores: HashMap::new(),
            }),
        }
    }

    /// The room's immutable short code.
    pub fn code(&self) -> &str {
        &self.code
    }

    fn lock(&self) -> MutexGuard<'_, RoomInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert (or overwrite) a player and report whether they became host.
    ///
    /// The first player to join an empty-hosted room becomes host. A zero
    /// score entry is initialized for players not seen before.
    pub fn add_player(&self, player: Player) -> bool {
        let mut inner = self.lock();

        inner.scores.entry(player.id).or_insert(0);
        let id = player.id;
        inner.players.insert(id, player);

        if inner.host_id.is_none() {
            inner.host_id = Some(id);
            return true;
        }
        false
    }

    /// Remove a player, reassigning the host role if they held it.
    ///
    /// Host reassignment is deterministic: the earliest remaining joiner
    /// becomes the new host, or the role stays empty when nobody is left.
    pub fn remove_player(&self, player_id: Uuid) {
        let mut inner = self.lock();

        inner.players.shift_remove(&player_id);

        if inner.host_id == Some(player_id) {
            inner.host_id = inner.players.keys().next().copied();
        }
    }

    /// Start a new round: validate, advance the round counter, install the
    /// question, clear prior answers, and open the answering window.
    pub fn start_game(
        &self,
        requester_id: Uuid,
        question: Question,
        answering: Duration,
    ) -> Result<(), GameError> {
        let mut inner = self.lock();

        if inner.host_id != Some(requester_id) {
            return Err(GameError::NotHost);
        }
        if inner.phase != Phase::Lobby && inner.phase != Phase::Results {
            return Err(GameError::BadPhase);
        }
        if inner.players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        if question.text.trim().is_empty()
            || question.options.len() != OPTIONS_PER_QUESTION
            || question.correct_id.trim().is_empty()
            || !question.has_option(&question.correct_id)
        {
            return Err(GameError::InvalidQuestion);
        }

        inner.round_number += 1;
        inner.current_question = Some(question);
        inner.answers.clear();

        let player_ids: Vec<Uuid> = inner.players.keys().copied().collect();
        for id in player_ids {
            inner.scores.entry(id).or_insert(0);
        }

        inner.phase = Phase::Answering;
        inner.answering_deadline = Some(SystemTime::now() + answering);
        Ok(())
    }

    /// Record a player's answer for the current round.
    ///
    /// First submission wins; retries are rejected with `AlreadyAnswered`
    /// rather than overwritten.
    pub fn submit_answer(&self, player_id: Uuid, option_id: &str) -> Result<(), GameError> {
        let mut inner = self.lock();

        if inner.phase != Phase::Answering {
            return Err(GameError::BadPhase);
        }
        if let Some(deadline) = inner.answering_deadline
            && SystemTime::now() >= deadline
        {
            return Err(GameError::DeadlinePassed);
        }

        let option_id = option_id.trim();
        if option_id.is_empty() {
            return Err(GameError::EmptyAnswer);
        }
        let valid = inner
            .current_question
            .as_ref()
            .is_some_and(|question| question.has_option(option_id));
        if !valid {
            return Err(GameError::InvalidOption);
        }

        if inner.answers.contains_key(&player_id) {
            return Err(GameError::AlreadyAnswered);
        }

        inner.answers.insert(player_id, option_id.to_string());
        Ok(())
    }

    /// Score the round and move to results, but only when the answering
    /// deadline has actually passed.
    ///
    /// Returns `None` (no effect) outside the answering phase or while the
    /// deadline is still in the future, which makes the call idempotent:
    /// once a round is scored, a second call observes the results phase and
    /// does nothing.
    pub fn finish_round_if_deadline_passed(&self) -> Option<RoundResultsPayload> {
        let mut inner = self.lock();

        if inner.phase != Phase::Answering {
            return None;
        }
        match inner.answering_deadline {
            Some(deadline) if SystemTime::now() >= deadline => {}
            _ => return None,
        }

        let question = inner.current_question.as_ref()?.clone();

        let mut results = Vec::with_capacity(inner.players.len());
        let rows: Vec<(Uuid, String, Option<String>)> = inner
            .players
            .iter()
            .map(|(id, player)| (*id, player.name.clone(), inner.answers.get(id).cloned()))
            .collect();
        for (id, name, selected) in rows {
            let correct = selected.as_deref() == Some(question.correct_id.as_str());
            if correct {
                *inner.scores.entry(id).or_insert(0) += 1;
            }
            results.push(RoundResult {
                player_id: id,
                name,
                selected_option_id: selected,
                correct,
                score: inner.scores.get(&id).copied().unwrap_or(0),
            });
        }

        inner.phase = Phase::Results;

        Some(RoundResultsPayload {
            code: self.code.clone(),
            round_number: inner.round_number,
            question: question.text,
            options: question.options,
            correct_option_id: question.correct_id,
            results,
        })
    }

    /// Take an independent copy of the room's externally visible state.
    pub fn snapshot(&self) -> RoomSnapshot {
        let inner = self.lock();

        let in_round = matches!(inner.phase, Phase::Answering | Phase::Results);
        let deadline = match (inner.phase, inner.answering_deadline) {
            (Phase::Answering, Some(deadline)) => deadline
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|since_epoch| since_epoch.as_millis() as u64),
            _ => None,
        };

        RoomSnapshot {
            code: self.code.clone(),
            phase: inner.phase,
            host_id: inner.host_id,
            round_number: inner.round_number,
            question: in_round
                .then(|| inner.current_question.as_ref().map(|q| q.text.clone()))
                .flatten(),
            options: in_round
                .then(|| inner.current_question.as_ref().map(|q| q.options.clone()))
                .flatten(),
            deadline,
            players: inner.players.values().cloned().collect(),
            scores: inner.scores.clone(),
        }
    }

    /// Backdate or clear the answering deadline. Test hook only.
    #[cfg(test)]
    pub(crate) fn force_deadline(&self, deadline: Option<SystemTime>) {
        self.lock().answering_deadline = deadline;
    }
}
