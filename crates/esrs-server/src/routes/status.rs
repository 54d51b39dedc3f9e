//! Service status: which collections serve traffic.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status: collection availability, merged sizes, model selection.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = &state.store;
    let merged: Vec<serde_json::Value> = store
        .layout()
        .sectors
        .keys()
        .filter_map(|label| store.merged(label))
        .map(|m| {
            serde_json::json!({
                "sector": m.sector_label,
                "index": m.index.name(),
                "documents": m.documents.len(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "ready": store.is_complete(),
        "collections": store.status(),
        "merged": merged,
        "sectorCodes": state.assistant.classifier().table().len(),
        "reranker": state.reranker,
        "embeddingDimension": state.config.embedding_dim,
        "llm": state.llm_status,
        "sessions": state.sessions.len(),
    }))
}
