use crate::handlers::{health, websocket};
use crate::middleware::logging;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/ws", get(websocket::ws_handler))
        .layer(middleware::from_fn(logging::logging_middleware))
        .with_state(state)
}
