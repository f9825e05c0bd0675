//! Session API: one reactive controller per client.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;
use volcanyx_common::error::ApiError;
use volcanyx_common::VolcanyxError;
use volcanyx_plot::ClickPayload;
use volcanyx_session::{ClickOutcome, ControlUpdate, ViewSnapshot};

use crate::state::SharedState;

/// A snapshot plus the Plotly figures the page draws directly.
#[derive(Debug, Serialize)]
pub struct ViewPayload {
    #[serde(flatten)]
    pub view: ViewSnapshot,
    pub volcano_figure: Option<Value>,
    pub drilldown_figure: Option<Value>,
}

impl From<ViewSnapshot> for ViewPayload {
    fn from(view: ViewSnapshot) -> Self {
        let volcano_figure = view.volcano.as_ref().map(|v| v.figure());
        let drilldown_figure = view
            .drilldown
            .panel
            .as_ref()
            .filter(|_| view.drilldown.visible)
            .map(|p| p.figure());
        Self { view, volcano_figure, drilldown_figure }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WaitQuery {
    /// Block until the requested volcano has been applied.
    #[serde(default)]
    pub wait: bool,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.registry.create().await;
    let view = handle.wait_for_volcano(1).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session_id": handle.id(),
            "view": ViewPayload::from(view),
        })),
    ))
}

/// POST /api/sessions/{id}/controls
pub async fn update_controls(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<WaitQuery>,
    Json(update): Json<ControlUpdate>,
) -> Result<Json<Value>, ApiError> {
    let handle = state.session(&id).await?;
    let generation = handle.update_controls(update).await?;
    debug!(session = %id, generation, "Controls updated");

    if !query.wait {
        return Ok(Json(json!({ "generation": generation })));
    }
    let view = handle.wait_for_volcano(generation).await?;
    Ok(Json(json!({
        "generation": generation,
        "view": ViewPayload::from(view),
    })))
}

/// POST /api/sessions/{id}/click
///
/// The body must be a JSON object; objects without a usable point are ignored.
pub async fn submit_click(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<ClickOutcome>, ApiError> {
    let handle = state.session(&id).await?;
    if !body.is_object() {
        return Err(VolcanyxError::MalformedEvent("click body must be a JSON object".to_string()).into());
    }
    let outcome = handle.click(ClickPayload::from_value(body)).await?;
    Ok(Json(outcome))
}

/// GET /api/sessions/{id}/view
pub async fn session_view(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ViewPayload>, ApiError> {
    let handle = state.session(&id).await?;
    Ok(Json(ViewPayload::from(handle.snapshot())))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.registry.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Unknown session {}", id)))
    }
}
