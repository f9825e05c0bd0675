//! Session outputs: the current view snapshot and the events pushed to clients.

use serde::Serialize;
use volcanyx_common::{ControlState, Paper};
use volcanyx_plot::{CategoryCounts, DrillDownPanel, VolcanoSpec};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrillDownView {
    pub visible: bool,
    pub panel: Option<DrillDownPanel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LinkStatus {
    #[default]
    Idle,
    Loading,
    Ready { papers: Vec<Paper> },
    Failed { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkPanel {
    pub gene: Option<String>,
    pub generation: u64,
    pub status: LinkStatus,
}

/// Latest applied state of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub controls: ControlState,
    /// Generation of the controls the current volcano was built from
    pub volcano_generation: u64,
    pub volcano: Option<VolcanoSpec>,
    pub selection_generation: u64,
    pub drilldown: DrillDownView,
    pub links: LinkPanel,
}

/// Pushed to subscribers whenever part of the view changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    VolcanoUpdated {
        generation: u64,
        counts: CategoryCounts,
        figure: serde_json::Value,
    },
    DrillDownUpdated {
        generation: u64,
        gene: String,
        visible: bool,
        figure: serde_json::Value,
    },
    LinksUpdated {
        generation: u64,
        gene: String,
        status: LinkStatus,
    },
}
