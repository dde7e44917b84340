//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or normalization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The request path is not an absolute API path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A required header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A resource identifier is empty or cannot be used as a path segment.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A request body could not be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A response payload does not have the expected shape.
    #[error("unexpected payload for {entity}: {message}")]
    UnexpectedPayload {
        /// Entity being normalized (e.g. "user").
        entity: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl DomainError {
    /// Builds an [`DomainError::UnexpectedPayload`] from a serde error.
    #[must_use]
    pub fn payload(entity: &'static str, error: &serde_json::Error) -> Self {
        Self::UnexpectedPayload {
            entity,
            message: error.to_string(),
        }
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
