//! Axum router: maps all URL paths to handlers.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    landing::{landing_page, volcano_page},
    sessions::{create_session, update_controls, submit_click, session_view, delete_session},
    health::health,
};
use crate::sse::session_events;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",         get(landing_page))
        .route("/volcano/", get(volcano_page))

        // Session API
        .route("/api/sessions",               post(create_session))
        .route("/api/sessions/{id}",          delete(delete_session))
        .route("/api/sessions/{id}/controls", post(update_controls))
        .route("/api/sessions/{id}/click",    post(submit_click))
        .route("/api/sessions/{id}/view",     get(session_view))

        // SSE streaming
        .route("/api/sessions/{id}/events", get(session_events))

        .route("/api/health", get(health))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
