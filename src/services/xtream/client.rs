//! Xtream Codes API Client
//!
//! HTTP client for the Xtream Codes Player API v2. Every response is
//! normalised into `crate::models` records before it leaves this module.

use super::types::*;
use crate::models::{Category, ContentKind, LiveChannel, SeriesDetails, SeriesItem, VodDetails, VodItem};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How much of an unparseable body is logged
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Leading `max_chars` characters of a body, cut on a char boundary
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Xtream API Error types
#[derive(Debug, thiserror::Error)]
pub enum XtreamError {
    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),
    /// HTTP error (non-2xx status)
    #[error("HTTP error: {0}")]
    Http(u16),
    /// JSON parsing error
    #[error("Parse error: {0}")]
    Parse(String),
    /// Empty response from server
    #[error("Empty response")]
    EmptyResponse,
    /// Account exists but is not usable; carries the panel's status string
    #[error("{0}")]
    AccountInactive(String),
    /// Failed to build the HTTP client
    #[error("Client setup failed: {0}")]
    Setup(String),
}

/// Xtream API Client
#[derive(Clone)]
pub struct XtreamClient {
    http: Client,
    credentials: XtreamCredentials,
    user_agent: String,
}

impl XtreamClient {
    /// Create a new Xtream client
    ///
    /// # Arguments
    /// * `credentials` - Server base URL plus account
    /// * `user_agent` - Sent with every request; some panels block unknown agents
    /// * `timeout` - Per-request timeout
    pub fn new(
        credentials: XtreamCredentials,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, XtreamError> {
        let server = url::Url::parse(&credentials.server).map_err(|e| {
            XtreamError::Setup(format!("Invalid server URL '{}': {}", credentials.server, e))
        })?;
        if !matches!(server.scheme(), "http" | "https") {
            return Err(XtreamError::Setup(format!(
                "Unsupported server scheme: {}",
                server.scheme()
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true) // Many Xtream servers have self-signed certs
            .build()
            .map_err(|e| XtreamError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            credentials,
            user_agent: user_agent.to_string(),
        })
    }

    /// Client with the default timeout and user agent
    pub fn from_credentials(credentials: XtreamCredentials) -> Result<Self, XtreamError> {
        Self::new(
            credentials,
            "VLC/3.0.20 LibVLC/3.0.20",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn credentials(&self) -> &XtreamCredentials {
        &self.credentials
    }

    /// Make a GET request with optional action parameter
    async fn get<T: DeserializeOwned>(&self, action: &str, extra: &str) -> Result<T, XtreamError> {
        let mut url = self.credentials.api_url();
        if !action.is_empty() {
            url.push_str("&action=");
            url.push_str(action);
        }
        url.push_str(extra);

        debug!("Xtream API request: {}{}", action, extra);

        let response = self
            .http
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| XtreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(XtreamError::Http(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| XtreamError::Network(e.to_string()))?;

        if text.trim().is_empty() || text == "null" {
            return Err(XtreamError::EmptyResponse);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse Xtream response for action '{}': {}",
                action, e
            );
            debug!("Response text: {}", preview(&text, RESPONSE_PREVIEW_CHARS));
            XtreamError::Parse(e.to_string())
        })
    }

    /// Lists are returned as `[]` when a category is empty
    async fn get_list<T: DeserializeOwned>(
        &self,
        action: &str,
        category_id: Option<&str>,
    ) -> Result<Vec<T>, XtreamError> {
        let extra = category_id
            .map(|id| format!("&category_id={}", urlencoding::encode(id)))
            .unwrap_or_default();
        match self.get(action, &extra).await {
            Err(XtreamError::EmptyResponse) => Ok(Vec::new()),
            other => other,
        }
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Authenticate; fails unless the account status is "Active"
    pub async fn login(&self) -> Result<XtreamAuthResponse, XtreamError> {
        let auth: XtreamAuthResponse = self.get("", "").await?;

        if !auth.user_info.is_active() {
            let status = auth
                .user_info
                .status
                .clone()
                .unwrap_or_else(|| "Invalid credentials".to_string());
            return Err(XtreamError::AccountInactive(status));
        }

        info!(
            "Xtream login ok. Account: {}, Expires: {:?}",
            auth.user_info.username.as_deref().unwrap_or(&self.credentials.username),
            auth.user_info.exp_date
        );

        Ok(auth)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn get_live_categories(&self) -> Result<Vec<Category>, XtreamError> {
        self.get_categories("get_live_categories").await
    }

    pub async fn get_vod_categories(&self) -> Result<Vec<Category>, XtreamError> {
        self.get_categories("get_vod_categories").await
    }

    pub async fn get_series_categories(&self) -> Result<Vec<Category>, XtreamError> {
        self.get_categories("get_series_categories").await
    }

    async fn get_categories(&self, action: &str) -> Result<Vec<Category>, XtreamError> {
        let raw: Vec<XtreamCategory> = self.get_list(action, None).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    /// Fetch live, VOD and series categories concurrently
    pub async fn refresh_categories(&self) -> Result<CategorySet, XtreamError> {
        let (live, vod, series) = futures::try_join!(
            self.get_live_categories(),
            self.get_vod_categories(),
            self.get_series_categories()
        )?;
        Ok(CategorySet { live, vod, series })
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Live streams, optionally filtered by category
    pub async fn get_live_streams(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<LiveChannel>, XtreamError> {
        let raw: Vec<XtreamLiveStream> = self.get_list("get_live_streams", category_id).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    /// VOD streams, optionally filtered by category
    pub async fn get_vod_streams(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<VodItem>, XtreamError> {
        let raw: Vec<XtreamVodStream> = self.get_list("get_vod_streams", category_id).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    /// Series, optionally filtered by category
    pub async fn get_series(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<SeriesItem>, XtreamError> {
        let raw: Vec<XtreamSeries> = self.get_list("get_series", category_id).await?;
        Ok(raw.into_iter().map(Into::into).collect())
    }

    pub async fn get_vod_info(&self, vod_id: &str) -> Result<VodDetails, XtreamError> {
        let extra = format!("&vod_id={}", urlencoding::encode(vod_id));
        let raw: XtreamVodInfo = self.get("get_vod_info", &extra).await?;
        Ok(raw.into_details())
    }

    pub async fn get_series_info(&self, series_id: &str) -> Result<SeriesDetails, XtreamError> {
        let extra = format!("&series_id={}", urlencoding::encode(series_id));
        let raw: XtreamSeriesInfo = self.get("get_series_info", &extra).await?;
        Ok(raw.into_details(series_id))
    }

    /// Playable URL for a stream id
    pub fn build_stream_url(&self, id: &str, kind: ContentKind) -> String {
        self.credentials.stream_url(id, kind)
    }
}

/// All three category lists, as loaded after login
#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    pub live: Vec<Category>,
    pub vod: Vec<Category>,
    pub series: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> XtreamClient {
        XtreamClient::from_credentials(XtreamCredentials::new(&server.uri(), "user", "pass"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_active_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .and(query_param("username", "user"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"user_info":{"username":"user","status":"Active","exp_date":"1999999999"},"server_info":{"url":"x","port":8080}}"#,
            ))
            .mount(&server)
            .await;

        let auth = client_for(&server).login().await.unwrap();
        assert!(auth.user_info.is_active());
        assert_eq!(auth.user_info.exp_timestamp(), Some(1_999_999_999));
        assert_eq!(auth.server_info.port.as_deref(), Some("8080"));
    }

    #[tokio::test]
    async fn test_login_surfaces_inactive_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"user_info":{"status":"Banned"}}"#),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).login().await.unwrap_err();
        assert!(matches!(err, XtreamError::AccountInactive(ref s) if s == "Banned"));
        assert_eq!(err.to_string(), "Banned");
    }

    #[tokio::test]
    async fn test_login_status_is_case_sensitive() {
        for status in ["active", "ACTIVE", " Active"] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/player_api.php"))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    r#"{{"user_info":{{"status":"{}"}}}}"#,
                    status
                )))
                .mount(&server)
                .await;

            let err = client_for(&server).login().await.unwrap_err();
            assert!(
                matches!(err, XtreamError::AccountInactive(ref s) if s == status),
                "accepted status {:?}",
                status
            );
        }
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        let body = format!("{}ção", "x".repeat(499));
        let cut = preview(&body, 500);
        assert_eq!(cut.chars().count(), 500);
        assert!(cut.ends_with('ç'));
        assert_eq!(preview("short", 500), "short");
    }

    #[tokio::test]
    async fn test_unparseable_non_ascii_body_is_a_parse_error() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(format!("{}ção", "x".repeat(499))),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get_live_categories().await.unwrap_err();
        assert!(matches!(err, XtreamError::Parse(_)));
    }

    #[tokio::test]
    async fn test_login_without_user_info_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"user_info":{"auth":0}}"#))
            .mount(&server)
            .await;

        let err = client_for(&server).login().await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_live_streams_by_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/player_api.php"))
            .and(query_param("action", "get_live_streams"))
            .and(query_param("category_id", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name":"One","stream_id":1,"stream_icon":"http://i/1.png"},{"name":"Two","stream_id":"2"}]"#,
            ))
            .mount(&server)
            .await;

        let channels = client_for(&server).get_live_streams(Some("3")).await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].id, "1");
        assert_eq!(channels[1].image, None);
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).get_vod_categories().await.unwrap_err();
        assert!(matches!(err, XtreamError::Http(503)));
    }

    #[tokio::test]
    async fn test_refresh_categories_loads_all_kinds() {
        let server = MockServer::start().await;
        for (action, name) in [
            ("get_live_categories", "News"),
            ("get_vod_categories", "Action"),
            ("get_series_categories", "Drama"),
        ] {
            Mock::given(method("GET"))
                .and(query_param("action", action))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    r#"[{{"category_id":1,"category_name":"{}","parent_id":0}}]"#,
                    name
                )))
                .mount(&server)
                .await;
        }

        let set = client_for(&server).refresh_categories().await.unwrap();
        assert_eq!(set.live[0].name, "News");
        assert_eq!(set.vod[0].name, "Action");
        assert_eq!(set.series[0].name, "Drama");
        assert_eq!(set.series[0].parent_id, None);
    }

    #[test]
    fn test_build_stream_url() {
        let client = XtreamClient::from_credentials(XtreamCredentials::new(
            "http://example.com:8080",
            "u",
            "p",
        ))
        .unwrap();
        assert_eq!(
            client.build_stream_url("5", ContentKind::Live),
            "http://example.com:8080/live/u/p/5.ts"
        );
    }

    #[test]
    fn test_rejects_malformed_server() {
        for server in ["panel:8080", "not a url", "ftp://panel"] {
            let result = XtreamClient::from_credentials(XtreamCredentials::new(server, "u", "p"));
            assert!(matches!(result, Err(XtreamError::Setup(_))), "accepted {}", server);
        }
    }
}
