//! Error types for the EO STAC services.

use thiserror::Error;

/// Result type alias using EoError.
pub type EoResult<T> = Result<T, EoError>;

/// Primary error type for dataset discovery and publication.
#[derive(Debug, Error)]
pub enum EoError {
    /// HTTP failure during catalog pagination or file download.
    /// Propagated, never retried; the failing unit is abandoned.
    #[error("Network error: {0}")]
    Network(String),

    /// Unrecognized product name or dataset edition. Fatal for the run.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Permission or existence failure from a storage backend.
    #[error("Storage access error: {0}")]
    StorageAccess(String),

    /// Unrecognized dekad label, malformed tile filename, or other bad
    /// input. Aborts the unit, not the batch.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for EoError {
    fn from(err: std::io::Error) -> Self {
        EoError::StorageAccess(err.to_string())
    }
}

impl From<serde_json::Error> for EoError {
    fn from(err: serde_json::Error) -> Self {
        EoError::Internal(format!("JSON error: {}", err))
    }
}
