use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Programmer/config errors raised by the engine. These fail fast: they indicate a
/// caller bug, never untrusted input (untrusted input is clamped or dropped instead).
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Auto-layout snapshot already captured for node {0}")]
    SnapshotAlreadyCaptured(String),

    #[error("No auto-layout snapshot for node {0}")]
    SnapshotMissing(String),

    #[error("Node {0} is not a flow container")]
    NotAFlowContainer(String),

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
}

/// Failure to apply new geometry to a single node. Caught at the node, logged and
/// skipped; never aborts the rest of the pass.
#[derive(Debug, Error, PartialEq)]
pub enum MutationError {
    #[error("Node {0} is locked")]
    Locked(String),

    #[error("Node {0} would receive non-finite geometry")]
    NonFiniteGeometry(String),

    #[error("Node {0} cannot be resized")]
    UnsupportedResize(String),
}

impl MutationError {
    pub fn node_id(&self) -> &str {
        match self {
            MutationError::Locked(id)
            | MutationError::NonFiniteGeometry(id)
            | MutationError::UnsupportedResize(id) => id,
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Engine(EngineError::UnknownTarget(id)) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_TARGET",
                format!("Target '{id}' is not in the catalog"),
            ),
            AppError::Engine(EngineError::InvalidDimensions { .. }) => (
                StatusCode::BAD_REQUEST,
                "INVALID_DIMENSIONS",
                self.to_string(),
            ),
            AppError::Engine(e) => {
                tracing::error!("Engine error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ENGINE_ERROR",
                    "The layout engine rejected an invalid internal state".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
