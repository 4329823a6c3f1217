//! Client error types.
//!
//! Build-time errors ([`BuildError`]) surface synchronously at the builder
//! call that caused them; everything else here is raised from the dispatching
//! side of a query or mutation.

use graft_core::BuildError;
use thiserror::Error;

/// Errors that can occur when querying or mutating entities.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An operation tree violated its entity schema.
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Transport failure: HTTP {status}: {message}")]
    Transport { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but did not match the expected shape.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Transport {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Transport failure: HTTP 503: unavailable");

        let err = ApiError::NotFound("/users/USR-1".to_string());
        assert_eq!(err.to_string(), "Not found: /users/USR-1");
    }

    #[test]
    fn test_build_error_converts() {
        let err: ApiError = BuildError::EmptyMutation.into();
        assert_eq!(
            err.to_string(),
            "Build error: mutation request contains no operations"
        );
    }
}
