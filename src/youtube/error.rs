//! Errors raised while executing a feed request.

use thiserror::Error;

/// Errors that can occur while fetching a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level error (DNS, connection, TLS, body read, etc.)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response, only raised when strict status checking is enabled
    #[error("HTTP error: status {status}")]
    HttpStatus { status: u16, body: String },
}

impl FeedError {
    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Transport(e) => e.status().map(|s| s.as_u16()),
            FeedError::HttpStatus { status, .. } => Some(*status),
        }
    }

    /// Whether this failure happened below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, FeedError::Transport(_))
    }
}
