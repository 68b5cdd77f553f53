use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::admin::{
        CreateQuestionRequest, ListQuestionsQuery, QuestionResponse, SetActiveRequest,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

/// Admin-only management endpoints for the question bank.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/questions",
            get(list_questions).post(create_question),
        )
        .route("/admin/questions/{id}/active", put(set_question_active))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Gate every admin route behind the configured bearer token.
///
/// An unconfigured token is a server-side misconfiguration (500), not an
/// authorization failure.
async fn require_admin_token(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = state.config().admin_token.as_deref() else {
        return Err(AppError::Internal("admin token not configured".into()));
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {token}"));
    if !authorized {
        return Err(AppError::Unauthorized("invalid admin token".into()));
    }

    Ok(next.run(request).await)
}

#[utoipa::path(
    post,
    path = "/admin/questions",
    tag = "admin",
    request_body = CreateQuestionRequest,
    responses(
        (status = 200, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Malformed question payload"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
/// Create a question in the bank.
pub async fn create_question(
    State(state): State<SharedState>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let created = admin_service::create_question(&state, payload).await?;
    info!(id = %created.id, active = created.is_active, "question created");
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/admin/questions",
    tag = "admin",
    params(("all" = Option<String>, Query, description = "Pass 1 to include inactive questions")),
    responses(
        (status = 200, description = "Questions", body = [QuestionResponse]),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
/// List questions, active only by default.
pub async fn list_questions(
    State(state): State<SharedState>,
    Query(query): Query<ListQuestionsQuery>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    let listed = admin_service::list_questions(&state, query.include_inactive()).await?;
    Ok(Json(listed))
}

#[utoipa::path(
    put,
    path = "/admin/questions/{id}/active",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Question identifier")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 404, description = "Unknown question id"),
        (status = 401, description = "Missing or invalid admin token")
    )
)]
/// Toggle a question's active flag.
pub async fn set_question_active(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    let updated = admin_service::set_question_active(&state, id, payload.is_active).await?;
    info!(id = %updated.id, active = updated.is_active, "question active flag updated");
    Ok(Json(updated))
}
