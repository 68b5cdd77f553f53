use tracing::warn;

use crate::dto::health::HealthResponse;
use crate::state::SharedState;

/// Respond with the backend's health, degraded when no question is playable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.questions().random_active().await {
        Ok(Some(_)) => HealthResponse::ok(),
        Ok(None) => HealthResponse::degraded(),
        Err(err) => {
            warn!(error = %err, "question bank health check failed");
            HealthResponse::degraded()
        }
    }
}
