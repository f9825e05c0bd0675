//! volcanyx-web: HTTP surface for the volcano viewer.
//! Provides:
//!   - Landing page and the interactive volcano page
//!   - Session API (create, controls, click, view, delete)
//!   - Per-session SSE stream of view updates
//!   - Health summary of the loaded tables

pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
