//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid product: {0}")]
    InvalidProduct(String),

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
