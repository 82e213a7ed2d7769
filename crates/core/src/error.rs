//! Error types for sheetbridge.

use sheetbridge_sheet::SheetError;
use thiserror::Error;

/// Result type for sheetbridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while moving tables between Google services.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Caller input rejected before any remote call was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A file could not be downloaded or decoded. The underlying cause is
    /// logged and dropped.
    #[error("Could not read the file with id {id}")]
    RemoteRead { id: String },

    /// A remote API answered with a non-success status.
    #[error("{service} API error (HTTP {status}): {message}")]
    Remote {
        service: String,
        status: u16,
        message: String,
    },

    /// A remote API answered successfully but the body lacked something required.
    #[error("Unexpected {service} API response: {message}")]
    UnexpectedResponse { service: String, message: String },

    /// A warehouse load job finished with an error result.
    #[error("Load job {job_id} failed: {message}")]
    LoadFailed { job_id: String, message: String },

    /// Credential loading or token exchange failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Table codec error.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a remote API error.
    pub fn remote(service: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Create an unexpected-response error.
    pub fn unexpected_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a remote-read error for a file id.
    pub fn remote_read(id: impl Into<String>) -> Self {
        Self::RemoteRead { id: id.into() }
    }

    /// True for a remote 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: 404, .. })
    }
}
