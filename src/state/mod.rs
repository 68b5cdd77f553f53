//! Shared application state: the room index, the connection registry, and
//! the question bank collaborator.

pub mod manager;
pub mod registry;
pub mod room;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::dao::{MemoryQuestionBank, QuestionBank};

pub use self::manager::RoomManager;
pub use self::registry::{ClientConnection, ConnectionRegistry, OUTBOUND_QUEUE_CAPACITY};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state threaded through every route and service.
pub struct AppState {
    config: AppConfig,
    rooms: RoomManager,
    questions: Arc<dyn QuestionBank>,
    registry: ConnectionRegistry,
}

impl AppState {
    /// Construct the state with the in-memory question bank.
    ///
    /// Spawns the registry event loop, so a Tokio runtime must be running.
    pub fn new(config: AppConfig) -> SharedState {
        Self::with_question_bank(config, Arc::new(MemoryQuestionBank::new()))
    }

    /// Construct the state around a specific question bank implementation.
    pub fn with_question_bank(config: AppConfig, questions: Arc<dyn QuestionBank>) -> SharedState {
        Arc::new(Self {
            config,
            rooms: RoomManager::new(),
            questions,
            registry: ConnectionRegistry::spawn(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Index of live rooms.
    pub fn rooms(&self) -> &RoomManager {
        &self.rooms
    }

    /// Handle to the question bank collaborator.
    pub fn questions(&self) -> Arc<dyn QuestionBank> {
        Arc::clone(&self.questions)
    }

    /// Handle to the connection registry event loop.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}
