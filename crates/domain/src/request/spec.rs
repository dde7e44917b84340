//! Outgoing API request value

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};
use crate::id::generate_id;

/// One logical call against the platform API.
///
/// The path is relative to the API target (`/api/users/me`); resolving it to
/// an absolute or same-origin URL is the executor's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Correlation id, sent as `X-Request-Id`.
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// API path, always starting with `/`
    pub path: String,
    /// Optional JSON body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Extra headers supplied by the caller
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request without a body.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request without a body.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attaches a JSON body serialized from `body`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attaches an already-built JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds an extra header. Caller headers override the client defaults.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the path without its query string.
    #[must_use]
    pub fn route(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(route, _)| route)
    }

    /// Returns true if a caller header with this name was supplied.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Checks the request is well formed before it is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or a header name is empty
    /// or contains characters that cannot appear in a header name.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.path.starts_with('/') || self.path.starts_with("//") {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }

        for (name, _) in &self.headers {
            let valid = !name.is_empty()
                && name
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
            if !valid {
                return Err(DomainError::InvalidHeaderName(name.clone()));
            }
        }

        Ok(())
    }
}

/// Builds `{prefix}/{id}{suffix}` after checking `id` is a single path segment.
///
/// # Errors
///
/// Returns [`DomainError::InvalidIdentifier`] if `id` is blank or contains
/// characters that would change the route (`/`, `?`, `#`, whitespace).
pub fn resource_path(prefix: &str, id: &str, suffix: &str) -> DomainResult<String> {
    let trimmed = id.trim();
    if trimmed.is_empty()
        || trimmed.len() != id.len()
        || id
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace())
    {
        return Err(DomainError::InvalidIdentifier(id.to_string()));
    }
    Ok(format!("{prefix}/{id}{suffix}"))
}
