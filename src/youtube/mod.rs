//! GData feed API integration module.
//!
//! Provides the client for fetching raw playlist, favorites, subscription,
//! upload and related-video feeds.

pub mod client;
pub mod error;
pub mod models;
pub mod params;

pub use client::{DebugHook, FeedClient};
pub use error::FeedError;
pub use models::{FeedResponse, LastError, OrderBy, ResponseFormat};
pub use params::{FeedRequest, Pagination, RequestParams};
