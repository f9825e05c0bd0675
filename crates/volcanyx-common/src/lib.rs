//! volcanyx-common: Shared types, errors, configuration and the outbound HTTP client
//! used across all Volcanyx crates.

pub mod config;
pub mod error;
pub mod models;
pub mod sandbox;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, VolcanyxError};
pub use models::{AnnotationResult, ColorCategory, Cohort, ControlState, GeneRecord, Paper};
