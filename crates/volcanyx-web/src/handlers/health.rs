use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// Loaded-table summary and live session count.
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    let store = state.store();
    Json(json!({
        "status": "ok",
        "diff_table": store.diff_status(),
        "load_report": store.report(),
        "sessions": state.registry.len().await,
    }))
}
