//! Error types for Skiff.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Raised before any external call is made
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Bucket listing or label read failures
    #[error("Bucket discovery failed: {0}")]
    Discovery(String),

    #[error("Artifact fetch failed for {name}: {message}")]
    ArtifactFetch { name: String, message: String },

    // Fan-out errors
    #[error("Copy to {destination} failed: {message}")]
    Copy {
        destination: String,
        message: String,
    },

    #[error("Public read grant on {bucket} failed: {message}")]
    Acl { bucket: String, message: String },

    #[error("Deployment failed for {failed} of {total} buckets")]
    PartialDeployment { failed: usize, total: usize },

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error was detected before any external call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
