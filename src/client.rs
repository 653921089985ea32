//! Evergreen API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Typed operations are implemented on the model types, and paginated
//! endpoints go through [`crate::pagination::paginate`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Serialize;
use url::Url;

use crate::error::{EvgError, Result};

const DEFAULT_API_SERVER: &str = "https://evergreen.mongodb.com";
const USER_AGENT: &str = concat!("evgapi/", env!("CARGO_PKG_VERSION"));

/// Network timeout applied to every request (matches the Evergreen CLI's
/// five minute default).
const NETWORK_TIMEOUT: Duration = Duration::from_secs(300);

/// Credential pair used to authenticate against the Evergreen API.
///
/// Credentials are installed as static request headers when the client is
/// constructed; they are not consulted again per request.
#[derive(Clone)]
pub struct EvgAuth {
    pub username: String,
    pub api_key: String,
}

impl EvgAuth {
    /// Create auth credentials from a username and API key.
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    /// Build the `Auth-User` / `Auth-Api` header pair Evergreen expects.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let user = HeaderValue::from_str(&self.username)
            .map_err(|_| EvgError::ConfigMissing("username is not a valid header value".into()))?;
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| EvgError::ConfigMissing("api key is not a valid header value".into()))?;
        headers.insert("Auth-User", user);
        headers.insert("Auth-Api", key);
        Ok(headers)
    }
}

impl std::fmt::Debug for EvgAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvgAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Low-level Evergreen API client.
///
/// Handles authentication and HTTP requests. Entity-specific operations are
/// implemented via the [`crate::Get`] trait and the per-model endpoint
/// functions.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use evgapi::EvgClient;
///
/// # fn example() -> evgapi::Result<()> {
/// // Create from environment variables
/// let client = EvgClient::from_env()?;
///
/// // Or configure manually
/// let auth = evgapi::EvgAuth::new("someone", "abc123");
/// let client = EvgClient::new(auth, "https://evergreen.mongodb.com")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EvgClient {
    http: Client,
    base_url: Arc<Url>,
}

impl std::fmt::Debug for EvgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvgClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl EvgClient {
    /// Create a client from environment variables.
    ///
    /// Uses `EVG_API_USER` and `EVG_API_KEY` for authentication and
    /// optionally `EVG_API_SERVER` for the base URL (defaults to
    /// `https://evergreen.mongodb.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if `EVG_API_USER` or `EVG_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let username = env::var("EVG_API_USER").map_err(|_| {
            EvgError::ConfigMissing("EVG_API_USER environment variable not set".to_string())
        })?;
        let api_key = env::var("EVG_API_KEY").map_err(|_| {
            EvgError::ConfigMissing("EVG_API_KEY environment variable not set".to_string())
        })?;

        let api_server =
            env::var("EVG_API_SERVER").unwrap_or_else(|_| DEFAULT_API_SERVER.to_string());

        Self::new(EvgAuth::new(username, api_key), &api_server)
    }

    /// Create a new client with the provided credentials and API server.
    ///
    /// # Arguments
    ///
    /// * `auth` - Evergreen credential pair
    /// * `api_server` - Base URL of the Evergreen API server
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the credentials cannot
    /// be encoded as headers.
    pub fn new(auth: EvgAuth, api_server: &str) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if api_server.ends_with('/') {
            api_server.to_string()
        } else {
            format!("{api_server}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .default_headers(auth.auth_headers()?)
            .timeout(NETWORK_TIMEOUT)
            .build()
            .map_err(EvgError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
        })
    }

    /// Get the base URL of the API server.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the absolute URL for a REST v2 endpoint.
    ///
    /// `url_v2("builds/abc123")` yields `{api_server}/rest/v2/builds/abc123`.
    pub fn url_v2(&self, endpoint: &str) -> Result<Url> {
        let endpoint = endpoint.trim_start_matches('/');
        Ok(self.base_url.join(&format!("rest/v2/{endpoint}"))?)
    }

    /// Make a GET request to a REST v2 endpoint.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = self.url_v2(endpoint)?;
        let no_query: [(&str, &str); 0] = [];
        self.get_url(url, &no_query).await
    }

    /// Make a GET request to a REST v2 endpoint with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.url_v2(endpoint)?;
        self.get_url(url, query).await
    }

    /// Make a GET request to an absolute URL with query parameters.
    ///
    /// Used by the paginated fetcher to follow server-supplied next-page
    /// locators, which are already absolute.
    #[tracing::instrument(skip(self, query), fields(url = %url))]
    pub async fn get_url<Q: Serialize + ?Sized>(&self, url: Url, query: &Q) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(EvgError::Http)?;

        Self::check_response(response).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = Self::extract_error_message(response, status).await;
        Err(EvgError::Api {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}
