//! GData feed client implementation.
//!
//! Builds feed URLs, attaches the GData headers and returns raw feed bodies.

use crate::config::ClientConfig;
use crate::youtube::error::FeedError;
use crate::youtube::models::{FeedResponse, LastError, OrderBy};
use crate::youtube::params::{FeedRequest, Pagination, RequestParams};
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use reqwest::header::CACHE_CONTROL;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Receives the final URL of every request while debug mode is on.
pub type DebugHook = Arc<dyn Fn(&str) + Send + Sync>;

/// GData feed client.
///
/// One method per read-only feed, all funnelled through [`FeedClient::fetch`].
pub struct FeedClient {
    /// HTTP client reused for every request
    client: Client,
    /// Normalized configuration
    config: ClientConfig,
    /// Whether final URLs are reported before each request
    debug: bool,
    /// Receiver for final URLs; falls back to `tracing` when unset
    debug_hook: Option<DebugHook>,
    /// Most recent failure, cleared by the next successful request
    last_error: Mutex<Option<LastError>>,
}

impl fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedClient")
            .field("config", &self.config)
            .field("debug", &self.debug)
            .field("debug_hook", &self.debug_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl FeedClient {
    /// Create a new feed client from configuration.
    ///
    /// # Arguments
    /// * `config` - Client configuration
    ///
    /// # Returns
    /// * `Result<FeedClient>` - New client or error
    ///
    /// # Details
    /// The configuration is normalized first (see [`ClientConfig::normalized`]).
    /// No request timeout is set unless `timeout_secs` is configured.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = config.normalized()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            debug: config.debug,
            config,
            debug_hook: None,
            last_error: Mutex::new(None),
        })
    }

    /// Install a receiver for final URLs, used while debug mode is on.
    pub fn with_debug_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.debug_hook = Some(Arc::new(hook));
        self
    }

    /// Turn reporting of final URLs on or off.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether final URLs are reported before each request.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Normalized configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Most recent request failure.
    ///
    /// # Returns
    /// * `Option<LastError>` - `None` if no request has failed yet or the
    ///   latest request succeeded
    pub fn last_error(&self) -> Option<LastError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch a user's playlists.
    pub async fn get_playlists_by_user(
        &self,
        username: &str,
        page: Pagination,
    ) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::UserPlaylists {
            username: username.to_string(),
            page,
        })
        .await
    }

    /// Fetch a user's favorite videos.
    pub async fn get_favorites_by_user(&self, username: &str) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::UserFavorites {
            username: username.to_string(),
        })
        .await
    }

    /// Fetch a single playlist.
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::Playlist {
            playlist_id: playlist_id.to_string(),
        })
        .await
    }

    /// Fetch a single entry of a playlist.
    pub async fn get_playlist_entry(
        &self,
        playlist_id: &str,
        entry_id: &str,
    ) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::PlaylistEntry {
            playlist_id: playlist_id.to_string(),
            entry_id: entry_id.to_string(),
        })
        .await
    }

    /// Fetch a user's subscriptions.
    pub async fn get_subscriptions_by_user(
        &self,
        username: &str,
        page: Pagination,
    ) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::UserSubscriptions {
            username: username.to_string(),
            page,
        })
        .await
    }

    /// Fetch a user's uploads.
    ///
    /// # Arguments
    /// * `username` - Uploader's username
    /// * `page` - Pagination window
    /// * `order_by` - Sort order; `None` leaves the server's relevance order
    pub async fn get_uploads_by_user(
        &self,
        username: &str,
        page: Pagination,
        order_by: Option<OrderBy>,
    ) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::UserUploads {
            username: username.to_string(),
            page,
            order_by,
        })
        .await
    }

    /// Fetch the videos related to a video.
    pub async fn get_related_videos(
        &self,
        video_id: &str,
        page: Pagination,
    ) -> Result<FeedResponse, FeedError> {
        self.fetch(&FeedRequest::RelatedVideos {
            video_id: video_id.to_string(),
            page,
        })
        .await
    }

    /// Final URL a request resolves to, format flag included.
    pub fn feed_url(&self, request: &FeedRequest) -> String {
        let url = format!("{}{}", self.config.base_url, request.path());
        self.with_format(request.params()).append_to(&url)
    }

    /// Fetch any supported feed.
    pub async fn fetch(&self, request: &FeedRequest) -> Result<FeedResponse, FeedError> {
        let url = format!("{}{}", self.config.base_url, request.path());
        self.execute(url, request.params()).await
    }

    fn with_format(&self, mut params: RequestParams) -> RequestParams {
        if let Some(alt) = self.config.format.alt_value() {
            params.push("alt", alt);
        }
        params
    }

    /// Perform the GET request for a feed.
    ///
    /// # Arguments
    /// * `url` - Feed URL without a query string
    /// * `params` - Query parameters; the format flag is appended last
    ///
    /// # Returns
    /// * `Result<FeedResponse, FeedError>` - Raw body or the captured failure
    ///
    /// # Details
    /// The outcome also updates `last_error`: failures replace it and a
    /// success clears it.
    async fn execute(&self, url: String, params: RequestParams) -> Result<FeedResponse, FeedError> {
        let url = self.with_format(params).append_to(&url);

        if self.debug {
            match &self.debug_hook {
                Some(hook) => hook(&url),
                None => tracing::info!(url = %url, "Feed request URL"),
            }
        }

        let result = self.send(&url).await;

        let captured = match &result {
            Ok(response) => {
                tracing::debug!(url = %url, status = response.status, "Fetched feed");
                None
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Feed request failed");
                Some(LastError::capture(&url, e))
            }
        };
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = captured;

        result
    }

    async fn send(&self, url: &str) -> Result<FeedResponse, FeedError> {
        let mut request = self
            .client
            .get(url)
            .header("GData-Version", "2")
            .header(CACHE_CONTROL, "no-cache");

        if let Some(key) = &self.config.developer_key {
            request = request.header("X-GData-Key", format!("key={}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if self.config.strict_status && !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(FeedResponse {
            url: url.to_string(),
            status: status.as_u16(),
            body,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::models::ResponseFormat;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ClientConfig {
        ClientConfig {
            base_url: format!("{}/", server.uri()),
            ..ClientConfig::default()
        }
    }

    /// Base URL pointing at a port nothing listens on.
    fn unreachable_base_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/feeds/", port)
    }

    #[test]
    fn test_client_new_with_defaults() {
        let client = FeedClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().base_url, "http://gdata.youtube.com/feeds/");
        assert!(!client.is_debug());
        assert!(client.last_error().is_none());
    }

    #[test]
    fn test_client_new_rejects_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(FeedClient::new(config).is_err());
    }

    #[test]
    fn test_feed_url_favorites_without_query() {
        let client = FeedClient::new(ClientConfig::default()).unwrap();
        let request = FeedRequest::UserFavorites {
            username: "bob".to_string(),
        };
        assert_eq!(
            client.feed_url(&request),
            "http://gdata.youtube.com/feeds/api/users/bob/favorites"
        );
    }

    #[test]
    fn test_feed_url_json_format_is_last() {
        let config = ClientConfig {
            format: ResponseFormat::Json,
            ..ClientConfig::default()
        };
        let client = FeedClient::new(config).unwrap();

        let uploads = FeedRequest::UserUploads {
            username: "alice".to_string(),
            page: Pagination::new(5, 10),
            order_by: Some(OrderBy::Published),
        };
        assert_eq!(
            client.feed_url(&uploads),
            "http://gdata.youtube.com/feeds/base/users/alice/uploads\
             ?max-results=5&start-index=10&orderby=published&alt=json"
        );

        let playlist = FeedRequest::Playlist {
            playlist_id: "PL1".to_string(),
        };
        assert_eq!(
            client.feed_url(&playlist),
            "http://gdata.youtube.com/feeds/api/playlists/PL1?alt=json"
        );
    }

    #[tokio::test]
    async fn test_fetch_sends_gdata_headers_and_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/bob/favorites"))
            .and(header("GData-Version", "2"))
            .and(header("Cache-Control", "no-cache"))
            .and(header("X-GData-Key", "key=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<feed/>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ClientConfig {
            developer_key: Some("secret".to_string()),
            ..config_for(&mock_server)
        };
        let client = FeedClient::new(config).unwrap();

        let response = client.get_favorites_by_user("bob").await.unwrap();
        assert_eq!(response.body, "<feed/>");
        assert_eq!(response.status, 200);
        assert!(client.last_error().is_none());
    }

    #[tokio::test]
    async fn test_fetch_omits_key_header_without_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<feed/>"))
            .mount(&mock_server)
            .await;

        let client = FeedClient::new(config_for(&mock_server)).unwrap();
        client.get_favorites_by_user("bob").await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-gdata-key").is_none());
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_returns_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("User not found"))
            .mount(&mock_server)
            .await;

        let client = FeedClient::new(config_for(&mock_server)).unwrap();
        let response = client.get_playlist("missing").await.unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(response.body, "User not found");
        assert!(client.last_error().is_none());
    }

    #[tokio::test]
    async fn test_strict_status_rejects_non_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let config = ClientConfig {
            strict_status: true,
            ..config_for(&mock_server)
        };
        let client = FeedClient::new(config).unwrap();
        let err = client.get_playlist("PL1").await.unwrap_err();

        assert!(matches!(err, FeedError::HttpStatus { status: 500, .. }));
        assert_eq!(client.last_error().unwrap().status, Some(500));
    }

    #[tokio::test]
    async fn test_transport_failure_sets_last_error_until_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<feed/>"))
            .mount(&mock_server)
            .await;

        let config = ClientConfig {
            base_url: unreachable_base_url(),
            ..ClientConfig::default()
        };
        let client = FeedClient::new(config).unwrap();

        let err = client.get_favorites_by_user("bob").await.unwrap_err();
        assert!(err.is_transport());

        let last = client.last_error().unwrap();
        assert!(last.url.ends_with("/feeds/api/users/bob/favorites"));
        assert!(last.status.is_none());

        // Keep the captured error, point the client at a live server.
        let healthy = FeedClient {
            config: config_for(&mock_server),
            ..client
        };
        let response = healthy.get_favorites_by_user("bob").await.unwrap();
        assert_eq!(response.body, "<feed/>");
        assert!(healthy.last_error().is_none());
    }

    #[tokio::test]
    async fn test_debug_hook_receives_final_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = ClientConfig {
            format: ResponseFormat::Rss,
            ..config_for(&mock_server)
        };
        let mut client = FeedClient::new(config)
            .unwrap()
            .with_debug_hook(move |url| sink.lock().unwrap().push(url.to_string()));

        client
            .get_related_videos("abc", Pagination::new(5, 0))
            .await
            .unwrap();
        assert!(seen.lock().unwrap().is_empty());

        client.set_debug(true);
        client
            .get_related_videos("abc", Pagination::new(5, 0))
            .await
            .unwrap();

        let urls = seen.lock().unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(
            urls[0],
            format!("{}/base/videos/abc/related?max-results=5&alt=rss", mock_server.uri())
        );
    }

    /// Log sink shared between the subscriber and the assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_debug_without_hook_logs_final_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = ClientConfig {
            debug: true,
            ..config_for(&mock_server)
        };
        let client = FeedClient::new(config).unwrap();
        assert!(client.is_debug());

        client
            .get_uploads_by_user("alice", Pagination::new(5, 0), Some(OrderBy::Published))
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Feed request URL"));
        assert!(output.contains(&format!(
            "{}/base/users/alice/uploads?max-results=5&orderby=published",
            mock_server.uri()
        )));
    }
}
