//! Error types for the Conflux backend client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when reading from the backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// No entry or object exists at the given key
    #[error("Not found: {0}")]
    NotFound(String),

    /// The stored bytes do not match the expected record shape
    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Connecting to the backend failed
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    /// A bucket could not be opened
    #[error("Unable to open bucket {bucket}: {source}")]
    Bucket {
        bucket: String,
        #[source]
        source: BoxError,
    },

    /// Any other backend failure while reading a key
    #[error("Backend error for {key}: {source}")]
    Backend {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl ClientError {
    pub(crate) fn backend(key: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            key: key.into(),
            source: source.into(),
        }
    }
}
