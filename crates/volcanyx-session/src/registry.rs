//! Process-wide registry of live sessions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;
use volcanyx_annotate::AnnotationFetcher;
use volcanyx_common::config::ControlsConfig;
use volcanyx_store::DataStore;

use crate::controller::SessionHandle;

/// Creates sessions against one shared store and fetcher.
pub struct SessionRegistry {
    store: Arc<DataStore>,
    fetcher: AnnotationFetcher,
    bounds: ControlsConfig,
    channel_capacity: usize,
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<DataStore>,
        fetcher: AnnotationFetcher,
        bounds: ControlsConfig,
        channel_capacity: usize,
    ) -> Self {
        Self {
            store,
            fetcher,
            bounds,
            channel_capacity,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub async fn create(&self) -> SessionHandle {
        let handle = SessionHandle::spawn(
            Arc::clone(&self.store),
            self.fetcher.clone(),
            self.bounds.clone(),
            self.channel_capacity,
        );
        self.sessions.write().await.insert(handle.id(), handle.clone());
        handle
    }

    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Forget a session. Its actor stops once outstanding handles are dropped.
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
