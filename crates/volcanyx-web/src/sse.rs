//! Server-Sent Events (SSE) streaming of per-session view updates.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;
use volcanyx_common::error::ApiError;

use crate::state::SharedState;

/// Drops the session from the registry when its event stream goes away.
struct SessionGuard {
    state: SharedState,
    id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let state = self.state.clone();
        let id = self.id;
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if state.registry.remove(&id).await {
                    info!(session = %id, "Event stream closed, session released");
                }
            });
        }
    }
}

/// SSE endpoint: one stream per session, carrying its `ViewEvent`s.
/// Events missed by a lagging client are dropped; `/view` has the full state.
/// The session lives as long as this stream.
pub async fn session_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let rx = state.session(&id).await?.subscribe();
    let guard = SessionGuard { state: state.clone(), id };
    let stream = BroadcastStream::new(rx)
        .filter_map(move |result| {
            let _held = &guard;
            result.ok().and_then(|event| {
                serde_json::to_string(&event).ok().map(|data| {
                    Ok(Event::default().data(data))
                })
            })
        });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}
