//! Application error types

use harbor_domain::{ApiEnvelope, ApiPayload, DomainError, FieldError, StatusCode, field_errors};
use serde_json::Value;
use thiserror::Error;

use crate::ports::{StorageError, TransportError};

/// Message returned when a 401 could not be recovered by refreshing.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Errors surfaced by every platform operation.
///
/// `Clone` because one coalesced call hands the same outcome to every waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("Network error: {message}")]
    Network {
        /// Transport description
        message: String,
    },

    /// No response within the configured timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// A 401 survived the refresh attempt, or the refresh itself failed.
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,

    /// A refresh was requested without any refresh token.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Login or refresh succeeded at the HTTP level but carried no access token.
    #[error("Token response did not include an access token")]
    MissingAccessToken,

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Http {
        /// HTTP status
        status: StatusCode,
        /// Message picked from `detail`, `error` or `message`
        message: String,
        /// Raw parsed body, for field-level detail
        body: Value,
    },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// The configured API target cannot produce a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A successful response did not have the expected shape.
    #[error("Unexpected response format: {0}")]
    Serialization(String),

    /// Durable session storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status, if the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw error body, if the backend sent one.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Field-level validation messages carried by the error body.
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.body().map(field_errors).unwrap_or_default()
    }

    /// True when the UI should send the user back to the login screen.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NoRefreshToken)
    }

    /// True for failures where no response arrived.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            TransportError::InvalidUrl(url) => Self::InvalidUrl(url),
            other => Self::Network {
                message: other.to_string(),
            },
        }
    }
}

impl<T> From<ApiError> for ApiEnvelope<T> {
    fn from(error: ApiError) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        let detail = error.body().filter(|body| !body.is_null()).cloned();
        Self::failure(error.to_string(), detail, status_code)
    }
}

/// Result type alias for platform operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Conversion of operation results into the uniform envelope.
pub trait ApiResultExt<T> {
    /// Converts the result to an [`ApiEnvelope`] for the presentation layer.
    fn into_envelope(self) -> ApiEnvelope<T>;
}

impl<T> ApiResultExt<T> for ApiResult<T> {
    fn into_envelope(self) -> ApiEnvelope<T> {
        match self {
            Ok(data) => ApiEnvelope::success(data),
            Err(error) => error.into(),
        }
    }
}

/// Converts a raw executor result; no content becomes `{"success": true}`.
#[must_use]
pub fn payload_envelope(result: ApiResult<ApiPayload>) -> ApiEnvelope<Value> {
    match result {
        Ok(ApiPayload::NoContent) => ApiEnvelope::empty(),
        Ok(ApiPayload::Json(value)) => ApiEnvelope::success(value),
        Err(error) => error.into(),
    }
}
