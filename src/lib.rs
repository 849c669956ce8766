//! Client for the video platform's GData feed API.
//!
//! Builds feed URLs for a fixed set of read-only endpoints, sends them with
//! the GData headers and hands back the raw Atom, RSS or JSON body.

pub mod config;
pub mod youtube;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use youtube::{
    DebugHook, FeedClient, FeedError, FeedRequest, FeedResponse, LastError, OrderBy, Pagination,
    RequestParams, ResponseFormat,
};
