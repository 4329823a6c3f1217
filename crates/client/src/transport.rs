//! Transport collaborator: "send this JSON to this path, get JSON back".
//!
//! The facades hold an `Arc<dyn Transport>` so the HTTP layer is injected
//! once at process start and substituted with a recording mock in tests.
//! Retries, interceptors, and cancellation policy are deliberately absent;
//! callers that need them wrap the transport.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::HttpConfig;
use crate::error::ApiError;

/// How many body characters end up in logs and error messages.
const BODY_SNIPPET_LEN: usize = 200;

/// A JSON-over-HTTP transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` (relative to the transport's base URL) and return the
    /// parsed JSON body.
    async fn get(&self, path: &str) -> Result<Value, ApiError>;

    /// POST `body` to `path` and return the parsed JSON response.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}

/// `reqwest`-backed [`Transport`].
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpTransport {
    /// Build a transport from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: HttpConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(HttpTransportInner { client, config }),
        })
    }

    fn url_for(&self, path: &str) -> String {
        // Plain concatenation: `Url::join` would drop a base path prefix
        // such as `/api/v2` for absolute endpoint paths.
        format!(
            "{}{path}",
            self.inner.config.base_url.as_str().trim_end_matches('/')
        )
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let mut request = request.header(reqwest::header::ACCEPT, "application/json");
        for (name, value) in &self.inner.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &self.inner.config.auth_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %text.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                "API request failed"
            );
            return Err(ApiError::Transport {
                status: status.as_u16(),
                message: text.chars().take(BODY_SNIPPET_LEN).collect(),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                body = %text.chars().take(BODY_SNIPPET_LEN).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url_for(path);
        debug!(%url, "GET");
        self.execute(self.inner.client.get(url)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.url_for(path);
        debug!(%url, "POST");
        self.execute(self.inner.client.post(url).json(body)).await
    }
}
