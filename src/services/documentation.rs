use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Rush Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::room_info,
        crate::routes::websocket::ws_handler,
        crate::routes::admin::create_question,
        crate::routes::admin::list_questions,
        crate::routes::admin::set_question_active,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::rooms::RoomCreatedResponse,
            crate::dto::rooms::RoomInfoResponse,
            crate::dto::admin::CreateQuestionRequest,
            crate::dto::admin::SetActiveRequest,
            crate::dto::admin::QuestionResponse,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::dto::ws::GameOverPayload,
            crate::state::room::RoomSnapshot,
            crate::state::room::RoundResultsPayload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room creation and lookup"),
        (name = "ws", description = "WebSocket gameplay protocol"),
        (name = "admin", description = "Question bank administration"),
    )
)]
pub struct ApiDoc;
