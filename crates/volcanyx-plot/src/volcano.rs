//! Volcano scatter description.
//!
//! x = logFC, y = -log10(adj. p-value), one trace per colour category, hover
//! label = gene symbol. A dashed guide marks the active threshold. When the
//! differential table is unusable the result is a titled placeholder with no
//! points; building a spec never fails.

use plotly::color::NamedColor;
use plotly::common::{DashType, HoverInfo, Line, Marker, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
use serde::Serialize;
use volcanyx_common::ColorCategory;
use volcanyx_store::DiffTableStatus;

use crate::classify::ClassifiedRow;

pub const TITLE: &str = "Volcano Plot";
pub const TITLE_NO_DATA: &str = "Volcano Plot (Data Not Available)";
pub const TITLE_MISSING_COLUMNS: &str = "Volcano Plot (Required Columns Missing)";
const X_LABEL: &str = "Log2 Fold Change";
const Y_LABEL: &str = "-log10 Adjusted P-Value";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolcanoPoint {
    pub symbol: String,
    pub x: f64,
    pub y: f64,
    pub color: ColorCategory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub up: usize,
    pub down: usize,
    pub not_significant: usize,
}

impl CategoryCounts {
    fn add(&mut self, category: ColorCategory) {
        match category {
            ColorCategory::Up             => self.up += 1,
            ColorCategory::Down           => self.down += 1,
            ColorCategory::NotSignificant => self.not_significant += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolcanoSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub threshold: f64,
    pub placeholder: bool,
    pub points: Vec<VolcanoPoint>,
    pub counts: CategoryCounts,
}

fn category_color(category: ColorCategory) -> NamedColor {
    match category {
        ColorCategory::Up             => NamedColor::Red,
        ColorCategory::Down           => NamedColor::RoyalBlue,
        ColorCategory::NotSignificant => NamedColor::LightGray,
    }
}

/// Build the volcano spec. Width and height are passed through unchanged.
pub fn render_volcano(
    rows: &[ClassifiedRow<'_>],
    status: &DiffTableStatus,
    threshold: f64,
    width: u32,
    height: u32,
) -> VolcanoSpec {
    let placeholder_title = match status {
        DiffTableStatus::MissingColumns(_) => Some(TITLE_MISSING_COLUMNS),
        DiffTableStatus::Empty => Some(TITLE_NO_DATA),
        DiffTableStatus::Ready if rows.is_empty() => Some(TITLE_NO_DATA),
        DiffTableStatus::Ready => None,
    };
    if let Some(title) = placeholder_title {
        return VolcanoSpec {
            title: title.to_string(),
            width,
            height,
            threshold,
            placeholder: true,
            points: Vec::new(),
            counts: CategoryCounts::default(),
        };
    }

    let mut counts = CategoryCounts::default();
    let points = rows
        .iter()
        .map(|row| {
            counts.add(row.class.color);
            VolcanoPoint {
                symbol: row.record.symbol.clone(),
                x: row.record.log_fc,
                y: row.record.neg_log10_p,
                color: row.class.color,
            }
        })
        .collect();

    VolcanoSpec {
        title: TITLE.to_string(),
        width,
        height,
        threshold,
        placeholder: false,
        points,
        counts,
    }
}

impl VolcanoSpec {
    /// y position of the threshold guide.
    pub fn threshold_y(&self) -> f64 {
        -self.threshold.log10()
    }

    pub fn to_plot(&self) -> Plot {
        let mut plot = Plot::new();

        if !self.placeholder {
            for category in ColorCategory::ALL {
                let members: Vec<&VolcanoPoint> = self.points.iter().filter(|p| p.color == category).collect();
                let trace = Scatter::new(
                    members.iter().map(|p| p.x).collect::<Vec<_>>(),
                    members.iter().map(|p| p.y).collect::<Vec<_>>(),
                )
                .mode(Mode::Markers)
                .name(category.label())
                .marker(Marker::new().color(category_color(category)).size(7).opacity(0.8))
                .hover_text_array(members.iter().map(|p| p.symbol.clone()).collect::<Vec<_>>())
                .hover_info(HoverInfo::Text);
                plot.add_trace(trace);
            }

            let (x_min, x_max) = self
                .points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
            if x_min.is_finite() && x_max.is_finite() {
                let y = self.threshold_y();
                let guide = Scatter::new(vec![x_min, x_max], vec![y, y])
                    .mode(Mode::Lines)
                    .name(format!("adj. p = {}", self.threshold))
                    .line(Line::new().color(NamedColor::DarkGray).dash(DashType::Dash))
                    .hover_info(HoverInfo::Skip)
                    .show_legend(false);
                plot.add_trace(guide);
            }
        }

        let layout = Layout::new()
            .title(Title::with_text(&self.title))
            .width(self.width as usize)
            .height(self.height as usize)
            .x_axis(Axis::new().title(Title::with_text(X_LABEL)))
            .y_axis(Axis::new().title(Title::with_text(Y_LABEL)));
        plot.set_layout(layout);
        plot
    }

    /// Plotly figure JSON (`{"data": [...], "layout": {...}}`).
    pub fn figure(&self) -> serde_json::Value {
        serde_json::from_str(&self.to_plot().to_json()).unwrap_or(serde_json::Value::Null)
    }
}
