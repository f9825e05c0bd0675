//! volcanyx-plot: Pure transforms from store rows and controls to figure specs.
//!
//! - [`classify`]: significance flag + colour category per record and threshold
//! - [`volcano`]: the volcano scatter description
//! - [`drilldown`]: click resolution and the per-cohort expression box plot
//!
//! Figures are emitted as Plotly JSON.

pub mod classify;
pub mod drilldown;
pub mod volcano;

pub use classify::{classify, classify_all, Classification, ClassifiedRow};
pub use drilldown::{resolve_click, ClickPayload, ClickPoint, CohortGroups, DrillDown, DrillDownPanel};
pub use volcano::{render_volcano, CategoryCounts, VolcanoPoint, VolcanoSpec};
