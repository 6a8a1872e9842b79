//! Error types for the mgrs-tiler crates.

use thiserror::Error;

/// Result type alias using TilerError.
pub type TilerResult<T> = Result<T, TilerError>;

/// Primary error type for tile pipeline operations.
#[derive(Debug, Error)]
pub enum TilerError {
    // === Configuration errors (fatal per configuration) ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid zoom range: {0}")]
    InvalidZoom(String),

    // === Fetch errors (per tile) ===
    #[error("Transient fetch failure: {0}")]
    FetchTransient(String),

    #[error("Permanent fetch failure: {0}")]
    FetchPermanent(String),

    // === Geodesy errors ===
    #[error("Projection error: {0}")]
    Projection(String),

    // === Image errors ===
    #[error("Image error: {0}")]
    Image(String),

    // === Archive errors (fatal for the job) ===
    #[error("Archive error: {0}")]
    Archive(String),
}

impl TilerError {
    /// Whether a retry may succeed. Only transient fetch failures
    /// (timeouts, connection resets, 5xx) qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, TilerError::FetchTransient(_))
    }
}

impl From<std::io::Error> for TilerError {
    fn from(err: std::io::Error) -> Self {
        TilerError::Archive(err.to_string())
    }
}
