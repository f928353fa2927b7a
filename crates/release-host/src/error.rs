//! Error types for release-host

use thiserror::Error;

/// Errors that can occur while talking to a release hosting service
#[derive(Error, Debug)]
pub enum HostError {
    /// Transport-level failure (connection, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Release, commit or repository not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local file could not be read for upload
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for HostError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HostError::Decode(err.to_string())
        } else {
            HostError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        HostError::Decode(err.to_string())
    }
}
