use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::layout::safe_area::{resolve_target_config, TargetConfig};
use crate::layout::{resolve_layout_profile, LayoutProfile};
use crate::models::node::ContentNode;
use crate::models::target::{TargetSpec, TARGET_CATALOG};
use crate::retarget::pipeline::{retarget_many, RetargetVariant};
use crate::signals::{parse_ai_payload, sanitize_ai_signals, AiSignals};
use crate::state::AppState;

#[derive(Serialize)]
pub struct TargetSummary {
    #[serde(flatten)]
    pub spec: TargetSpec,
    pub aspect_ratio: f64,
    pub profile: LayoutProfile,
    pub config: TargetConfig,
}

#[derive(Serialize)]
pub struct TargetListResponse {
    pub targets: Vec<TargetSummary>,
}

#[derive(Serialize)]
pub struct SignalsResponse {
    pub document_id: String,
    /// `null` when nothing in the payload survived sanitization.
    pub signals: Option<AiSignals>,
}

#[derive(Deserialize)]
pub struct RetargetRequest {
    pub document_id: Option<String>,
    pub source: ContentNode,
    pub target_ids: Vec<String>,
    /// Raw provider output; sanitized before use.
    pub ai_signals: Option<Value>,
}

#[derive(Serialize)]
pub struct RetargetResponse {
    pub document_id: Option<String>,
    pub signals_used: bool,
    pub variants: Vec<RetargetVariant>,
}

/// A JSON string is provider text (possibly fenced); anything else is the bundle itself.
fn sanitize_payload(raw: &Value) -> Option<AiSignals> {
    match raw {
        Value::String(text) => parse_ai_payload(text),
        other => sanitize_ai_signals(other),
    }
}

/// GET /api/v1/targets
pub async fn handle_list_targets(State(state): State<AppState>) -> Json<TargetListResponse> {
    let targets = TARGET_CATALOG
        .iter()
        .map(|spec| TargetSummary {
            spec: *spec,
            aspect_ratio: spec.aspect_ratio(),
            profile: resolve_layout_profile(spec.size()),
            config: resolve_target_config(spec, state.engine.safe_area_ratio),
        })
        .collect();
    Json(TargetListResponse { targets })
}

/// POST /api/v1/documents/:document_id/signals
pub async fn handle_put_signals(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Json(raw): Json<Value>,
) -> Result<Json<SignalsResponse>, AppError> {
    if document_id.trim().is_empty() {
        return Err(AppError::Validation("document_id must not be empty".to_string()));
    }
    let signals = sanitize_payload(&raw);
    info!(
        document_id = %document_id,
        usable = signals.is_some(),
        "AI signals cached"
    );
    state
        .signal_cache
        .write()
        .await
        .insert(document_id.clone(), signals.clone());
    Ok(Json(SignalsResponse { document_id, signals }))
}

/// POST /api/v1/retarget
pub async fn handle_retarget(
    State(state): State<AppState>,
    Json(req): Json<RetargetRequest>,
) -> Result<Json<RetargetResponse>, AppError> {
    if req.target_ids.is_empty() {
        return Err(AppError::Validation("target_ids must not be empty".to_string()));
    }

    let signals = match (&req.ai_signals, &req.document_id) {
        (Some(raw), document_id) => {
            let signals = sanitize_payload(raw);
            if let Some(id) = document_id {
                state.signal_cache.write().await.insert(id.clone(), signals.clone());
            }
            signals
        }
        (None, Some(id)) => state.signal_cache.read().await.get(id).cloned().flatten(),
        (None, None) => None,
    };
    let signals_used = signals.is_some();

    // Planning is CPU-bound; keep it off the async executor.
    let engine = state.engine.clone();
    let source = req.source;
    let target_ids = req.target_ids;
    let variants = tokio::task::spawn_blocking(move || {
        retarget_many(&source, &target_ids, signals.as_ref(), &engine)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in retarget: {e}")))??;

    Ok(Json(RetargetResponse {
        document_id: req.document_id,
        signals_used,
        variants,
    }))
}
