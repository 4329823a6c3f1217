//! Transport configuration.
//!
//! A plain value constructed by the embedding application and handed to
//! [`HttpTransport`](crate::transport::HttpTransport) once at startup. No
//! environment variables are read here; how the values are sourced is the
//! application's business.

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors that can occur during construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// HTTP transport configuration.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct HttpConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Default headers sent with every request, in declaration order.
    pub headers: Vec<(String, String)>,
    /// Bearer token injected into the `Authorization` header when present.
    pub auth_token: Option<SecretString>,
}

impl HttpConfig {
    /// Create a configuration for the given base URL with default timeout,
    /// no extra headers, and no auth token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when `base_url` does not
    /// parse as an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            auth_token: None,
        })
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
