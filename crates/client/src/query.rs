//! Read-side facade: typed GET wrappers over the shared transport.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::transport::Transport;
use crate::validate::{JsonValidator, Validator};

/// Search criteria rendered as query parameters, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    params: Vec<(String, String)>,
}

impl SearchFilters {
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a `field=value` criterion.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Percent-encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (field, value) in &self.params {
            serializer.append_pair(field, value);
        }
        serializer.finish()
    }
}

/// Read-only client for one resource endpoint.
///
/// `T` is the single-item model returned by [`get`](Self::get); `P` the
/// collection payload returned by [`search`](Self::search) and
/// [`details`](Self::details) (list endpoints wrap their items in a paging
/// envelope). Responses are checked by the facade's validators before they
/// reach the caller.
pub struct Query<T, P = serde_json::Value> {
    transport: Arc<dyn Transport>,
    endpoint: String,
    item: Arc<dyn Validator<T>>,
    page: Arc<dyn Validator<P>>,
}

impl<T, P> std::fmt::Debug for Query<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl<T, P> Query<T, P>
where
    T: DeserializeOwned + 'static,
    P: DeserializeOwned + 'static,
{
    /// Create a facade for `endpoint` (e.g. `/users`) with serde-backed
    /// validation.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, endpoint: impl Into<String>) -> Self {
        Self::with_validators(
            transport,
            endpoint,
            Arc::new(JsonValidator::new()),
            Arc::new(JsonValidator::new()),
        )
    }
}

impl<T, P> Query<T, P> {
    /// Create a facade with custom validators.
    #[must_use]
    pub fn with_validators(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        item: Arc<dyn Validator<T>>,
        page: Arc<dyn Validator<P>>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            item,
            page,
        }
    }

    /// Fetch one entity by key.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for a 404, [`ApiError::Validation`]
    /// when the payload does not match `T`, and transport errors otherwise.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn get(&self, key: &str) -> Result<T, ApiError> {
        let path = format!("{}/{key}", self.endpoint);
        let value = match self.transport.get(&path).await {
            Err(ApiError::Transport { status: 404, .. }) => {
                return Err(ApiError::NotFound(path));
            }
            other => other?,
        };
        self.item.validate(&value)
    }

    /// Search the resource with the given filters.
    ///
    /// # Errors
    ///
    /// Returns transport errors or [`ApiError::Validation`] when the payload
    /// does not match `P`.
    #[instrument(skip(self, filters), fields(endpoint = %self.endpoint))]
    pub async fn search(&self, filters: &SearchFilters) -> Result<P, ApiError> {
        let path = if filters.is_empty() {
            format!("{}/search", self.endpoint)
        } else {
            format!("{}/search?{}", self.endpoint, filters.to_query_string())
        };
        let value = self.transport.get(&path).await?;
        self.page.validate(&value)
    }

    /// Fetch the collection view of the endpoint.
    ///
    /// # Errors
    ///
    /// Returns transport errors or [`ApiError::Validation`] when the payload
    /// does not match `P`.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn details(&self) -> Result<P, ApiError> {
        let value = self.transport.get(&self.endpoint).await?;
        self.page.validate(&value)
    }
}
