//! Shared application state for the web server.

use std::sync::Arc;

use uuid::Uuid;
use volcanyx_annotate::AnnotationFetcher;
use volcanyx_common::error::ApiError;
use volcanyx_common::AppConfig;
use volcanyx_session::{SessionHandle, SessionRegistry};
use volcanyx_store::DataStore;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: AppConfig,
    pub registry: SessionRegistry,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<DataStore>, fetcher: AnnotationFetcher) -> Self {
        let registry = SessionRegistry::new(
            store,
            fetcher,
            config.controls.clone(),
            config.server.session_channel_capacity,
        );
        Self { config, registry }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        self.registry.store()
    }

    /// Look up a live session or fail with 404.
    pub async fn session(&self, id: &Uuid) -> Result<SessionHandle, ApiError> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| ApiError::not_found(format!("Unknown session {}", id)))
    }
}

pub type SharedState = Arc<AppState>;
