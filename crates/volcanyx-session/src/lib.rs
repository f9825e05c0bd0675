//! volcanyx-session: Per-client reactive controller.
//!
//! Each session is an actor task owning its [`ControlState`]. Control changes
//! and clicks arrive in order over a channel; volcano renders and annotation
//! fetches run off the actor and report back tagged with a generation, and a
//! result is applied only while its generation is still current.
//!
//! ```text
//! {threshold, width, height} ──► volcano spec
//! {click} ──► drill-down panel ──► selected gene ──► annotation fetch ──► link list
//! ```
//!
//! [`ControlState`]: volcanyx_common::ControlState

pub mod controller;
pub mod registry;
pub mod view;

pub use controller::{ClickOutcome, ControlUpdate, SessionHandle};
pub use registry::SessionRegistry;
pub use view::{DrillDownView, LinkPanel, LinkStatus, ViewEvent, ViewSnapshot};
