//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors talking to the credential API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API base URL cannot have paths appended to it.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// An HTML template failed to render.
    #[error("failed to render template: {0}")]
    Render(#[from] askama::Error),

    /// A local file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}
