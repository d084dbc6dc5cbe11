pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::retarget::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/targets", get(handlers::handle_list_targets))
        .route(
            "/api/v1/documents/:document_id/signals",
            post(handlers::handle_put_signals),
        )
        .route("/api/v1/retarget", post(handlers::handle_retarget))
        .with_state(state)
}
