//! Service layer: business logic behind the REST and WebSocket routes.

pub mod admin_service;
pub mod documentation;
pub mod game_service;
pub mod health_service;
pub mod round_scheduler;
pub mod websocket_service;
