use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolcanyxError {
    // ── Data errors (input tables) ───────────────────────────────────────────
    #[error("Required columns missing from {table}: {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("Invalid value in column {column} at row {row}: {value:?}")]
    InvalidValue { column: String, row: usize, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Lookup misses ────────────────────────────────────────────────────────
    #[error("Not found: {0}")]
    LookupMiss(String),

    // ── Network failures ─────────────────────────────────────────────────────
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request timed out after {0} s")]
    Timeout(u64),

    #[error("Malformed upstream response: {0}")]
    Parse(String),

    #[error("Network capabilities capped: domain not in allowlist for URL {0}")]
    Blocked(String),

    // ── Events / configuration ───────────────────────────────────────────────
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VolcanyxError {
    /// Network-class failures degrade to a message in the link panel.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Timeout(_) | Self::Parse(_) | Self::Blocked(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VolcanyxError>;

/// Error type returned by HTTP handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
}

impl From<VolcanyxError> for ApiError {
    fn from(err: VolcanyxError) -> Self {
        let status = match &err {
            VolcanyxError::LookupMiss(_) => StatusCode::NOT_FOUND,
            VolcanyxError::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            VolcanyxError::SessionClosed => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
