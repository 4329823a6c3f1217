//! Response validation seam.
//!
//! Every payload coming back over the transport passes through a
//! [`Validator`] before it reaches the caller. The default implementation
//! deserializes with `serde`; applications with their own schema machinery
//! can plug in anything that satisfies the trait.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Checks a raw JSON value against an expected shape and produces the typed
/// result.
pub trait Validator<T>: Send + Sync {
    /// Validate `value`, returning [`ApiError::Validation`] on mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not satisfy the expected shape.
    fn validate(&self, value: &Value) -> Result<T, ApiError>;
}

/// serde-backed validator: a value is valid iff it deserializes into `T`.
pub struct JsonValidator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonValidator<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Validator<T> for JsonValidator<T> {
    fn validate(&self, value: &Value) -> Result<T, ApiError> {
        serde_json::from_value(value.clone()).map_err(|e| ApiError::Validation(e.to_string()))
    }
}
