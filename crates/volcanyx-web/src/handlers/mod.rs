//! HTTP handlers for all web routes.

pub mod landing;
pub mod sessions;
pub mod health;
