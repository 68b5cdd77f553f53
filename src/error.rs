use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::StorageError;

/// Validation failures raised by a room's state-machine operations.
///
/// These are returned to the requesting client as an `error` envelope and
/// never mutate room state; they are not system failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The requester is not the room's host.
    #[error("not host")]
    NotHost,
    /// The operation is not legal in the room's current phase.
    #[error("bad phase")]
    BadPhase,
    /// The room has no players.
    #[error("no players")]
    NoPlayers,
    /// The supplied question fails the 4-option shape checks.
    #[error("invalid question")]
    InvalidQuestion,
    /// The answering deadline has already passed.
    #[error("deadline passed")]
    DeadlinePassed,
    /// The submitted option id was empty after trimming.
    #[error("empty answer")]
    EmptyAnswer,
    /// The submitted option id is not one of the current question's options.
    #[error("invalid option")]
    InvalidOption,
    /// The player already answered this round.
    #[error("already answered")]
    AlreadyAnswered,
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A room operation was rejected by its state machine.
    #[error(transparent)]
    Game(#[from] GameError),
    /// The question bank has no active questions to serve.
    #[error("no active questions")]
    NoQuestions,
    /// Storage backend failure.
    #[error("storage unavailable")]
    Storage(#[source] StorageError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Game(game) => AppError::Conflict(game.to_string()),
            ServiceError::NoQuestions => AppError::Conflict("no active questions".into()),
            ServiceError::Storage(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
