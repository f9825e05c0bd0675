//! Click resolution: volcano point → gene → per-cohort expression box plot.

use plotly::box_plot::BoxPoints;
use plotly::color::NamedColor;
use plotly::common::{Marker, Title};
use plotly::layout::Axis;
use plotly::{BoxPlot, Layout, Plot};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volcanyx_common::Cohort;
use volcanyx_store::{DataStore, DonorValue, ExpressionRow};

/// Plotly click event data. Only the hover label is read; point indices and
/// other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickPayload {
    #[serde(default)]
    pub points: Option<Vec<ClickPoint>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickPoint {
    #[serde(default)]
    pub hovertext: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ClickPoint {
    /// Hover label of the point: `hovertext`, falling back to `text`.
    pub fn label(&self) -> Option<&str> {
        self.hovertext
            .as_deref()
            .or(self.text.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl ClickPayload {
    /// Lenient parse: anything that does not deserialize is an empty payload.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            debug!("Malformed click payload: {}", e);
            Self::default()
        })
    }

    fn first_label(&self) -> Option<&str> {
        self.points.as_ref()?.first()?.label()
    }
}

/// Donor values of one gene split by cohort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CohortGroups {
    pub old: Vec<DonorValue>,
    pub young: Vec<DonorValue>,
}

impl CohortGroups {
    pub fn partition(row: &ExpressionRow) -> Self {
        let (old, young) = row.values.iter().cloned().partition(|v| v.cohort == Cohort::Old);
        Self { old, young }
    }

    pub fn len(&self) -> usize {
        self.old.len() + self.young.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A visible drill-down panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDownPanel {
    pub selected_gene: String,
    pub title: String,
    /// `None` when the gene has no expression row
    pub groups: Option<CohortGroups>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillDown {
    /// Payload carried no usable point; keep whatever is shown.
    NoOp,
    Panel(DrillDownPanel),
}

pub fn no_data_title(symbol: &str) -> String {
    format!("no expression data found for {}", symbol)
}

pub fn resolve_click(store: &DataStore, payload: &ClickPayload) -> DrillDown {
    let Some(symbol) = payload.first_label() else {
        debug!("Click payload without a labelled point, ignoring");
        return DrillDown::NoOp;
    };

    let panel = match store.get_expression_row(symbol) {
        None => DrillDownPanel {
            selected_gene: symbol.to_string(),
            title: no_data_title(symbol),
            groups: None,
        },
        Some(row) => {
            let groups = CohortGroups::partition(row);
            if groups.is_empty() {
                debug!(symbol, "Expression row has no readable donor values");
            }
            DrillDownPanel {
                selected_gene: symbol.to_string(),
                title: format!("{} expression: Old vs Young donors", symbol),
                groups: Some(groups),
            }
        }
    };
    DrillDown::Panel(panel)
}

fn cohort_trace(name: &str, values: &[DonorValue], color: NamedColor) -> Box<BoxPlot<f64, f64>> {
    BoxPlot::new(values.iter().map(|v| v.value).collect::<Vec<f64>>())
        .name(name)
        .box_points(BoxPoints::All)
        .jitter(0.3)
        .marker(Marker::new().color(color))
        .text_array(values.iter().map(|v| v.donor_id.clone()).collect::<Vec<_>>())
}

impl DrillDownPanel {
    pub fn to_plot(&self) -> Plot {
        let mut plot = Plot::new();
        if let Some(groups) = &self.groups {
            plot.add_trace(cohort_trace(Cohort::Old.as_str(), &groups.old, NamedColor::DarkOrange));
            plot.add_trace(cohort_trace(Cohort::Young.as_str(), &groups.young, NamedColor::SeaGreen));
        }
        let layout = Layout::new()
            .title(Title::with_text(&self.title))
            .y_axis(Axis::new().title(Title::with_text("Expression")));
        plot.set_layout(layout);
        plot
    }

    pub fn figure(&self) -> serde_json::Value {
        serde_json::from_str(&self.to_plot().to_json()).unwrap_or(serde_json::Value::Null)
    }
}
