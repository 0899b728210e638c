//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::types::PlatformError;
use crate::config::PlatformConfig;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossy, truncated for error messages.
    pub fn body_snippet(&self) -> String {
        const MAX_SNIPPET: usize = 512;
        let text = String::from_utf8_lossy(&self.body);
        text.chars().take(MAX_SNIPPET).collect()
    }
}

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. Non-2xx statuses are returned as
/// responses, not errors; only transport failures are errors.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, PlatformError>> + Send;

    /// Performs an HTTP POST request with a JSON body.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = Result<HttpResponse, PlatformError>> + Send;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
    access_token: Option<String>,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the given timeout and no credentials.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("landmask/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            access_token: None,
        })
    }

    /// Creates a client from platform settings.
    ///
    /// The bearer token is read from the environment variable named by
    /// `token_env`. A missing token is not an error here; the platform
    /// will reject unauthenticated requests itself.
    pub fn from_config(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let client = Self::with_timeout(config.timeout)?;
        match std::env::var(&config.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(client.with_access_token(token)),
            _ => {
                warn!(
                    token_env = %config.token_env,
                    "No access token in environment, requests are unauthenticated"
                );
                Ok(client)
            }
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into().trim().to_string());
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<HttpResponse, PlatformError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| PlatformError::Http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| PlatformError::Http(format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, PlatformError> {
        self.send(self.client.get(url), url).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, PlatformError> {
        self.send(self.client.post(url).json(body), url).await
    }
}
