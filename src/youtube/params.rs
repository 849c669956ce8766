//! Endpoint paths and query parameter assembly.
//!
//! Everything here is pure string building so request shapes can be
//! checked without touching the network.

use std::fmt::Display;

use crate::youtube::models::OrderBy;

/// Ordered list of `key=value` query parameters.
///
/// Entries are kept in append order and never de-duplicated; the server
/// parses by key, so order only affects the literal query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `key=value` entry. The value is not percent-encoded.
    pub fn push(&mut self, key: &str, value: impl Display) {
        self.0.push(format!("{}={}", key, value));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Entries joined with `&`, or `None` when there are none.
    pub fn query_string(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.join("&"))
        }
    }

    /// Append the query string to `url` as `?<joined>`.
    ///
    /// # Arguments
    /// * `url` - URL without a query string
    ///
    /// # Returns
    /// * `String` - `url` unchanged when there are no parameters
    pub fn append_to(&self, url: &str) -> String {
        match self.query_string() {
            Some(query) => format!("{}?{}", url, query),
            None => url.to_string(),
        }
    }
}

/// Pagination window for a feed.
///
/// Zero means "unset, use the server default" for both fields. That
/// sentinel also makes a genuine value of zero impossible to send; existing
/// callers depend on the resulting request shapes, so it is left as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of entries to return (`max-results`)
    pub max_results: u32,
    /// 1-based index of the first entry to return (`start-index`)
    pub start_index: u32,
}

impl Pagination {
    pub const fn new(max_results: u32, start_index: u32) -> Self {
        Self {
            max_results,
            start_index,
        }
    }

    /// Append `max-results` and `start-index` to `params`.
    ///
    /// # Details
    /// Each combination is matched on its own: both set emits
    /// `max-results` then `start-index`, a single set field emits only
    /// itself, and nothing is emitted when both are zero.
    pub fn append_to(&self, params: &mut RequestParams) {
        let Pagination {
            max_results,
            start_index,
        } = *self;

        if max_results != 0 && start_index != 0 {
            params.push("max-results", max_results);
            params.push("start-index", start_index);
        }
        if max_results == 0 && start_index != 0 {
            params.push("start-index", start_index);
        }
        if max_results != 0 && start_index == 0 {
            params.push("max-results", max_results);
        }
    }
}

/// One of the read-only feeds the client knows how to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedRequest {
    /// A user's playlists
    UserPlaylists { username: String, page: Pagination },
    /// A user's favorite videos
    UserFavorites { username: String },
    /// A single playlist
    Playlist { playlist_id: String },
    /// A single entry of a playlist
    PlaylistEntry {
        playlist_id: String,
        entry_id: String,
    },
    /// A user's subscriptions
    UserSubscriptions { username: String, page: Pagination },
    /// A user's uploads, relevance-ordered unless `order_by` is set
    UserUploads {
        username: String,
        page: Pagination,
        order_by: Option<OrderBy>,
    },
    /// Videos related to a video
    RelatedVideos { video_id: String, page: Pagination },
}

impl FeedRequest {
    /// Path of the feed relative to the client's base URL.
    pub fn path(&self) -> String {
        match self {
            FeedRequest::UserPlaylists { username, .. } => {
                format!("api/users/{}/playlists", username)
            }
            FeedRequest::UserFavorites { username } => format!("api/users/{}/favorites", username),
            FeedRequest::Playlist { playlist_id } => format!("api/playlists/{}", playlist_id),
            FeedRequest::PlaylistEntry {
                playlist_id,
                entry_id,
            } => format!("api/playlists/{}/{}", playlist_id, entry_id),
            FeedRequest::UserSubscriptions { username, .. } => {
                format!("base/users/{}/subscriptions", username)
            }
            FeedRequest::UserUploads { username, .. } => format!("base/users/{}/uploads", username),
            FeedRequest::RelatedVideos { video_id, .. } => {
                format!("base/videos/{}/related", video_id)
            }
        }
    }

    /// Query parameters of the feed, without the format flag.
    pub fn params(&self) -> RequestParams {
        let mut params = RequestParams::new();
        match self {
            FeedRequest::UserFavorites { .. }
            | FeedRequest::Playlist { .. }
            | FeedRequest::PlaylistEntry { .. } => {}
            FeedRequest::UserPlaylists { page, .. }
            | FeedRequest::UserSubscriptions { page, .. }
            | FeedRequest::RelatedVideos { page, .. } => page.append_to(&mut params),
            FeedRequest::UserUploads { page, order_by, .. } => {
                page.append_to(&mut params);
                if let Some(order) = order_by
                    && !order.as_str().is_empty()
                {
                    params.push("orderby", order);
                }
            }
        }
        params
    }
}
