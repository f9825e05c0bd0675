//! Session actor and its handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info};
use uuid::Uuid;
use volcanyx_annotate::AnnotationFetcher;
use volcanyx_common::config::ControlsConfig;
use volcanyx_common::{AnnotationResult, ControlState, Result, VolcanyxError};
use volcanyx_plot::{classify_all, render_volcano, resolve_click, ClickPayload, DrillDown, VolcanoSpec};
use volcanyx_store::DataStore;

use crate::view::{DrillDownView, LinkPanel, LinkStatus, ViewEvent, ViewSnapshot};

/// Partial control change; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlUpdate {
    pub threshold: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Payload had no usable point; nothing changed.
    Ignored,
    Selected { gene: String, generation: u64 },
}

enum Command {
    Controls { update: ControlUpdate, reply: oneshot::Sender<u64> },
    Click { payload: ClickPayload, reply: oneshot::Sender<ClickOutcome> },
}

/// Work finished off the actor, tagged with the generation it was started for.
enum Completed {
    Volcano { generation: u64, spec: VolcanoSpec },
    Annotation { generation: u64, result: AnnotationResult },
}

/// Apply an update to `controls`, clamping into the configured bounds.
pub fn apply_update(controls: &mut ControlState, update: &ControlUpdate, bounds: &ControlsConfig) {
    if let Some(t) = update.threshold.filter(|t| t.is_finite()) {
        let (lo, hi) = bounds.threshold_bounds;
        let clamped = t.clamp(lo, hi);
        if clamped != t {
            debug!(requested = t, clamped, "Threshold clamped");
        }
        controls.significance_threshold = clamped;
    }
    if let Some(w) = update.width {
        let (lo, hi) = bounds.width_bounds;
        controls.figure_width = w.clamp(lo, hi);
        if controls.figure_width != w {
            debug!(requested = w, clamped = controls.figure_width, "Width clamped");
        }
    }
    if let Some(h) = update.height {
        let (lo, hi) = bounds.height_bounds;
        controls.figure_height = h.clamp(lo, hi);
        if controls.figure_height != h {
            debug!(requested = h, clamped = controls.figure_height, "Height clamped");
        }
    }
}

struct SessionActor {
    id: Uuid,
    store: Arc<DataStore>,
    fetcher: AnnotationFetcher,
    bounds: ControlsConfig,
    controls: ControlState,
    volcano_requested: u64,
    volcano_applied: u64,
    selection_generation: u64,
    commands: mpsc::Receiver<Command>,
    completed_tx: mpsc::UnboundedSender<Completed>,
    completed_rx: mpsc::UnboundedReceiver<Completed>,
    view: watch::Sender<ViewSnapshot>,
    events: broadcast::Sender<ViewEvent>,
}

impl SessionActor {
    fn new(
        store: Arc<DataStore>,
        fetcher: AnnotationFetcher,
        bounds: ControlsConfig,
        channel_capacity: usize,
    ) -> (Self, SessionHandle) {
        let id = Uuid::new_v4();
        let controls = ControlState {
            significance_threshold: bounds.default_threshold,
            figure_width: bounds.default_width,
            figure_height: bounds.default_height,
            selected_gene: None,
        };
        let (cmd_tx, cmd_rx) = mpsc::channel(channel_capacity.max(1));
        let (completed_tx, completed_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(ViewSnapshot {
            controls: controls.clone(),
            ..ViewSnapshot::default()
        });
        let (events, _) = broadcast::channel(channel_capacity.max(1));

        let actor = Self {
            id,
            store,
            fetcher,
            bounds,
            controls,
            volcano_requested: 0,
            volcano_applied: 0,
            selection_generation: 0,
            commands: cmd_rx,
            completed_tx,
            completed_rx,
            view: view_tx,
            events: events.clone(),
        };
        let handle = SessionHandle { id, commands: cmd_tx, view: view_rx, events };
        (actor, handle)
    }

    async fn run(mut self) {
        self.request_volcano();
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Controls { update, reply }) => {
                        let generation = self.handle_controls(update);
                        let _ = reply.send(generation);
                    }
                    Some(Command::Click { payload, reply }) => {
                        let outcome = self.handle_click(payload);
                        let _ = reply.send(outcome);
                    }
                    None => break,
                },
                Some(done) = self.completed_rx.recv() => match done {
                    Completed::Volcano { generation, spec } => self.apply_volcano(generation, spec),
                    Completed::Annotation { generation, result } => self.apply_annotation(generation, result),
                },
            }
        }
        info!(session = %self.id, "Session closed");
    }

    fn publish(&self, event: ViewEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ── Volcano ───────────────────────────────────────────────────────────────

    /// The snapshot's controls move only when the matching volcano is applied.
    fn handle_controls(&mut self, update: ControlUpdate) -> u64 {
        apply_update(&mut self.controls, &update, &self.bounds);
        self.request_volcano()
    }

    fn request_volcano(&mut self) -> u64 {
        self.volcano_requested += 1;
        let generation = self.volcano_requested;
        let store = Arc::clone(&self.store);
        let threshold = self.controls.significance_threshold;
        let (width, height) = (self.controls.figure_width, self.controls.figure_height);
        let tx = self.completed_tx.clone();

        tokio::task::spawn_blocking(move || {
            let rows = classify_all(store.records(), threshold);
            let spec = render_volcano(&rows, store.diff_status(), threshold, width, height);
            let _ = tx.send(Completed::Volcano { generation, spec });
        });
        generation
    }

    fn apply_volcano(&mut self, generation: u64, spec: VolcanoSpec) {
        if generation <= self.volcano_applied {
            debug!(session = %self.id, generation, applied = self.volcano_applied, "Discarding stale volcano render");
            return;
        }
        self.volcano_applied = generation;

        let event = ViewEvent::VolcanoUpdated {
            generation,
            counts: spec.counts,
            figure: spec.figure(),
        };
        self.view.send_modify(|v| {
            v.controls.significance_threshold = spec.threshold;
            v.controls.figure_width = spec.width;
            v.controls.figure_height = spec.height;
            v.volcano_generation = generation;
            v.volcano = Some(spec);
        });
        self.publish(event);
    }

    // ── Drill-down and annotation ─────────────────────────────────────────────

    fn handle_click(&mut self, payload: ClickPayload) -> ClickOutcome {
        let panel = match resolve_click(&self.store, &payload) {
            DrillDown::NoOp => return ClickOutcome::Ignored,
            DrillDown::Panel(panel) => panel,
        };

        self.selection_generation += 1;
        let generation = self.selection_generation;
        let gene = panel.selected_gene.clone();
        self.controls.selected_gene = Some(gene.clone());
        debug!(session = %self.id, %gene, generation, "Gene selected");

        let drilldown_event = ViewEvent::DrillDownUpdated {
            generation,
            gene: gene.clone(),
            visible: true,
            figure: panel.figure(),
        };
        self.view.send_modify(|v| {
            v.controls.selected_gene = Some(gene.clone());
            v.selection_generation = generation;
            v.drilldown = DrillDownView { visible: true, panel: Some(panel) };
            v.links = LinkPanel {
                gene: Some(gene.clone()),
                generation,
                status: LinkStatus::Loading,
            };
        });
        self.publish(drilldown_event);
        self.publish(ViewEvent::LinksUpdated {
            generation,
            gene: gene.clone(),
            status: LinkStatus::Loading,
        });

        let fetcher = self.fetcher.clone();
        let tx = self.completed_tx.clone();
        let symbol = gene.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&symbol).await;
            let _ = tx.send(Completed::Annotation { generation, result });
        });

        ClickOutcome::Selected { gene, generation }
    }

    fn apply_annotation(&mut self, generation: u64, result: AnnotationResult) {
        let current = self.controls.selected_gene.as_deref() == Some(result.gene_symbol.as_str());
        if generation != self.selection_generation || !current {
            debug!(
                session = %self.id,
                gene = %result.gene_symbol,
                generation,
                current = self.selection_generation,
                "Discarding stale annotation result"
            );
            return;
        }

        let status = match result.failure {
            Some(message) => LinkStatus::Failed { message },
            None => LinkStatus::Ready { papers: result.papers },
        };
        let gene = result.gene_symbol;
        self.view.send_modify(|v| {
            v.links = LinkPanel {
                gene: Some(gene.clone()),
                generation,
                status: status.clone(),
            };
        });
        self.publish(ViewEvent::LinksUpdated { generation, gene, status });
    }
}

/// Cloneable handle to a running session. The actor stops once every handle
/// is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<ViewSnapshot>,
    events: broadcast::Sender<ViewEvent>,
}

impl SessionHandle {
    /// Start a session actor. Must be called inside a Tokio runtime.
    pub fn spawn(
        store: Arc<DataStore>,
        fetcher: AnnotationFetcher,
        bounds: ControlsConfig,
        channel_capacity: usize,
    ) -> Self {
        let (actor, handle) = SessionActor::new(store, fetcher, bounds, channel_capacity);
        tokio::spawn(actor.run());
        info!(session = %handle.id, "Session started");
        handle
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a control change. Returns the volcano generation it will produce.
    pub async fn update_controls(&self, update: ControlUpdate) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Controls { update, reply })
            .await
            .map_err(|_| VolcanyxError::SessionClosed)?;
        rx.await.map_err(|_| VolcanyxError::SessionClosed)
    }

    /// Submit a click. The drill-down panel is updated before this returns;
    /// the annotation fetch continues in the background.
    pub async fn click(&self, payload: ClickPayload) -> Result<ClickOutcome> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Click { payload, reply })
            .await
            .map_err(|_| VolcanyxError::SessionClosed)?;
        rx.await.map_err(|_| VolcanyxError::SessionClosed)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Wait until a volcano built from `generation` (or newer) is applied.
    pub async fn wait_for_volcano(&self, generation: u64) -> Result<ViewSnapshot> {
        let mut rx = self.view.clone();
        let snapshot = rx
            .wait_for(|v| v.volcano_generation >= generation)
            .await
            .map_err(|_| VolcanyxError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    /// Wait until the link panel leaves the loading state for `generation`,
    /// or a newer selection replaces it.
    pub async fn wait_for_links(&self, generation: u64) -> Result<ViewSnapshot> {
        let mut rx = self.view.clone();
        let snapshot = rx
            .wait_for(|v| {
                v.links.generation > generation
                    || (v.links.generation == generation && v.links.status != LinkStatus::Loading)
            })
            .await
            .map_err(|_| VolcanyxError::SessionClosed)?;
        Ok(snapshot.clone())
    }
}
