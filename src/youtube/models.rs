//! GData feed models and data structures.
//!
//! Contains the response format and ordering selectors plus the values
//! handed back to callers after a feed request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::youtube::error::FeedError;

/// Serialization the server should use for a feed.
///
/// Atom is the server default, so it sends no `alt` parameter at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Atom XML (server default)
    #[default]
    Atom,
    /// RSS 2.0
    Rss,
    /// JSON
    Json,
}

impl ResponseFormat {
    /// Value for the `alt` query parameter, if one must be sent.
    ///
    /// # Returns
    /// * `Option<&'static str>` - `None` for Atom, otherwise the `alt` value
    pub fn alt_value(self) -> Option<&'static str> {
        match self {
            ResponseFormat::Atom => None,
            ResponseFormat::Rss => Some("rss"),
            ResponseFormat::Json => Some("json"),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atom" | "" => Ok(ResponseFormat::Atom),
            "rss" => Ok(ResponseFormat::Rss),
            "json" => Ok(ResponseFormat::Json),
            other => Err(anyhow::anyhow!(
                "Unknown response format '{}': expected atom, rss or json",
                other
            )),
        }
    }
}

/// Sort order for a user's uploads.
///
/// Leaving the order unset means the server sorts by relevance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// Newest first (`published`)
    Published,
    /// Most viewed first (`viewCount`)
    ViewCount,
    /// Any other value the server accepts, passed through verbatim
    Other(String),
}

impl OrderBy {
    /// Value for the `orderby` query parameter.
    pub fn as_str(&self) -> &str {
        match self {
            OrderBy::Published => "published",
            OrderBy::ViewCount => "viewCount",
            OrderBy::Other(value) => value,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "published" => OrderBy::Published,
            "viewCount" => OrderBy::ViewCount,
            other => OrderBy::Other(other.to_string()),
        })
    }
}

/// Raw feed returned by the server.
///
/// The body is never parsed here; interpreting Atom, RSS or JSON is up
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    /// Final URL that was requested, query string included
    pub url: String,
    /// HTTP status code of the response
    pub status: u16,
    /// Response body as text
    pub body: String,
    /// When the body finished downloading
    pub fetched_at: DateTime<Utc>,
}

impl FeedResponse {
    /// Whether the server answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Snapshot of the most recent failed request.
///
/// # Details
/// `FeedError` wraps a non-cloneable `reqwest::Error`, so the client keeps
/// this rendered copy around for the `last_error` accessor while the
/// original error is returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    /// URL of the failed request
    pub url: String,
    /// Rendered error message
    pub message: String,
    /// HTTP status, when the failure was a rejected status code
    pub status: Option<u16>,
    /// When the failure was captured
    pub occurred_at: DateTime<Utc>,
}

impl LastError {
    /// Capture a failure for the given URL.
    pub fn capture(url: &str, error: &FeedError) -> Self {
        Self {
            url: url.to_string(),
            message: error.to_string(),
            status: error.status(),
            occurred_at: Utc::now(),
        }
    }
}

impl fmt::Display for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.url)
    }
}
