//! Error types for modelprep

use thiserror::Error;

/// Main error type for modelprep operations
#[derive(Error, Debug)]
pub enum Error {
    /// A ratio, axis or tolerance outside its domain. Raised before any mutation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The host is in a state that forbids mutation, e.g. an object in edit mode.
    #[error("Host state conflict: {0}")]
    HostStateConflict(String),

    /// Any other failure surfaced by a host collaborator call.
    #[error("Unexpected host failure: {0}")]
    UnexpectedHostFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// True for errors that abort a batch midway rather than before it starts
    pub fn is_host_error(&self) -> bool {
        matches!(
            self,
            Error::HostStateConflict(_) | Error::UnexpectedHostFailure(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type alias for modelprep operations
pub type Result<T> = std::result::Result<T, Error>;
