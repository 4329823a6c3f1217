//! Write-side facade: compile drafts, batch roots, dispatch one request.

use std::sync::Arc;

use graft_core::{BuildError, EntityDraft, EntityOperation, MutationRequest, SchemaRegistry};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::ApiError;
use crate::transport::Transport;
use crate::validate::{JsonValidator, Validator};

/// Mutation client for one entity type behind one resource endpoint.
///
/// The facade itself is stateless; every [`create_entity`](Self::create_entity)
/// / [`update_entity`](Self::update_entity) call starts an independent
/// [`PendingMutation`], so concurrent builds never share memory.
pub struct Mutation<T> {
    transport: Arc<dyn Transport>,
    endpoint: String,
    registry: Arc<SchemaRegistry>,
    entity: String,
    validator: Arc<dyn Validator<T>>,
}

impl<T: DeserializeOwned + 'static> Mutation<T> {
    /// Create a facade for `entity` (a type name in `registry`) behind
    /// `endpoint`, with serde-backed response validation.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        registry: Arc<SchemaRegistry>,
        entity: impl Into<String>,
    ) -> Self {
        Self::with_validator(
            transport,
            endpoint,
            registry,
            entity,
            Arc::new(JsonValidator::new()),
        )
    }
}

impl<T> Mutation<T> {
    /// Create a facade with a custom response validator.
    #[must_use]
    pub fn with_validator(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        registry: Arc<SchemaRegistry>,
        entity: impl Into<String>,
        validator: Arc<dyn Validator<T>>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            registry,
            entity: entity.into(),
            validator,
        }
    }

    /// Start an empty batch.
    #[must_use]
    pub fn batch(&self) -> PendingMutation<'_, T> {
        PendingMutation {
            client: self,
            roots: Vec::new(),
        }
    }

    /// Start a mutation that creates one entity.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the draft violates the entity schema.
    pub fn create_entity(&self, draft: EntityDraft) -> Result<PendingMutation<'_, T>, BuildError> {
        self.batch().create_entity(draft)
    }

    /// Start a mutation that updates the entity identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is empty or the draft violates
    /// the entity schema.
    pub fn update_entity(
        &self,
        key: impl Into<String>,
        draft: EntityDraft,
    ) -> Result<PendingMutation<'_, T>, BuildError> {
        self.batch().update_entity(key, draft)
    }
}

impl<T> std::fmt::Debug for Mutation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("endpoint", &self.endpoint)
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

/// An accumulated batch of validated root operations, dispatched by
/// [`mutate`](Self::mutate).
#[must_use = "a pending mutation does nothing until `mutate()` is awaited"]
pub struct PendingMutation<'a, T> {
    client: &'a Mutation<T>,
    roots: Vec<EntityOperation>,
}

impl<T> std::fmt::Debug for PendingMutation<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingMutation")
            .field("client", &self.client)
            .field("roots", &self.roots)
            .finish()
    }
}

impl<T> PendingMutation<'_, T> {
    /// Append a `create` root compiled from `draft`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the draft violates the entity schema.
    pub fn create_entity(mut self, draft: EntityDraft) -> Result<Self, BuildError> {
        let operation =
            EntityOperation::create(&self.client.registry, &self.client.entity, draft)?;
        self.roots.push(operation);
        Ok(self)
    }

    /// Append an `update` root compiled from `draft`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the key is empty or the draft violates
    /// the entity schema.
    pub fn update_entity(
        mut self,
        key: impl Into<String>,
        draft: EntityDraft,
    ) -> Result<Self, BuildError> {
        let operation =
            EntityOperation::update(&self.client.registry, &self.client.entity, key, draft)?;
        self.roots.push(operation);
        Ok(self)
    }

    /// Append a directly constructed root operation.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the operation tree violates the entity
    /// schema, so a malformed hand-built tree is rejected before dispatch.
    pub fn operation(mut self, operation: EntityOperation) -> Result<Self, BuildError> {
        operation.validate(&self.client.registry, &self.client.entity)?;
        self.roots.push(operation);
        Ok(self)
    }

    /// The wire request this batch would dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyMutation`] when no root was added.
    pub fn request(&self) -> Result<MutationRequest, BuildError> {
        if self.roots.is_empty() {
            return Err(BuildError::EmptyMutation);
        }
        Ok(MutationRequest::from(self.roots.clone()))
    }

    /// Serialize the batch and dispatch it as one request.
    ///
    /// Exactly one network operation per call; the whole tree is sent as a
    /// single body and never resent piecemeal.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyMutation`] (before any I/O) when no root
    /// was added, transport errors from dispatch, and
    /// [`ApiError::Validation`] when the response does not match `T`.
    #[instrument(
        skip(self),
        fields(endpoint = %self.client.endpoint, roots = self.roots.len())
    )]
    pub async fn mutate(self) -> Result<T, ApiError> {
        let request = self.request()?;
        let body = serde_json::to_value(&request)?;
        let response = self.client.transport.post(&self.client.endpoint, &body).await?;
        self.client.validator.validate(&response)
    }
}
