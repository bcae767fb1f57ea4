//! Common error types for DriveGate.

use thiserror::Error;

/// Top-level error type for DriveGate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed (e.g. reading the service-account key).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credential exchange failed or the remote store rejected the token.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The remote store refused access to the resource.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure or unexpected response from the remote store.
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// Whether this error means the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
