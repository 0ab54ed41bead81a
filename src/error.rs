//! Error types for the config store and the layout engine.

use thiserror::Error;

/// Failures talking to a config store or screen provider.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered 404.
    #[error("Endpoint not found: {0}")]
    NotFound(String),

    /// Backend answered with a 5xx status.
    #[error("Server error: HTTP {0}")]
    Server(u16),

    /// Any other non-success status.
    #[error("Unexpected HTTP status: {0}")]
    Unexpected(u16),

    /// Body was not the JSON shape we expect.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source cannot answer on this platform or in this setup.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

/// Failures surfaced by [`crate::layout::LayoutEngine`]. In-memory state is
/// left consistent whenever one of these is returned.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Failed to load widget configuration: {0}")]
    Load(#[source] StoreError),

    #[error("Failed to save configuration: {0}")]
    Save(#[source] StoreError),

    #[error("Save worker exited without reporting a result")]
    SaveWorkerLost,
}
