//! Catalog store error types.

use thiserror::Error;

/// Catalog store operation errors.
///
/// `DuplicateKey`, `NotFound`, `InvalidRange` and `InvalidInput` are caller
/// errors: the store is unchanged and the caller may retry differently (for
/// example as an update instead of a registration).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Whether the error was caused by the request rather than the store.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey(_) | Self::NotFound(_) | Self::InvalidRange(_) | Self::InvalidInput(_)
        )
    }
}

impl From<eocat_core::Error> for CatalogError {
    fn from(e: eocat_core::Error) -> Self {
        use eocat_core::Error;
        match e {
            Error::InvalidRange(msg) => Self::InvalidRange(msg),
            Error::Config(msg) => Self::Config(msg),
            other @ (Error::InvalidTimestamp(_)
            | Error::InvalidProduct(_)
            | Error::InvalidBoundingBox(_)
            | Error::InvalidQuery(_)) => Self::InvalidInput(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
