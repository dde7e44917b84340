//! Raw HTTP response value
//!
//! Contains the raw transport response and the normalized payload the
//! executor hands back to operations.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Error text used when a response body is not valid JSON.
pub const INVALID_RESPONSE_FORMAT: &str = "Invalid response format";

/// HTTP status code with semantic helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 204 No Content
    pub const NO_CONTENT: Self = Self(204);
    /// 401 Unauthorized
    pub const UNAUTHORIZED: Self = Self(401);

    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns true if this is a 2xx success status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true for 401, the signal that the access token expired.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.0 == Self::UNAUTHORIZED.0
    }

    /// Returns the canonical reason phrase for common status codes.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// HTTP response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers, lower-cased names.
    pub headers: HashMap<String, String>,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Time from send to last body byte.
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a new `ResponseSpec` from raw response data.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: HashMap<String, String>,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status: status.into(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            body,
            duration,
        }
    }

    /// Shorthand for a JSON response, used heavily by test transports.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::new(status, headers, body.to_string().into_bytes(), Duration::ZERO)
    }

    /// Parses the body as JSON.
    ///
    /// An empty body is `null`. A body that is not valid JSON is replaced by
    /// `{"error": "Invalid response format"}` instead of failing, so callers
    /// always get a value to inspect.
    #[must_use]
    pub fn body_json(&self) -> Value {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|_| json!({ "error": INVALID_RESPONSE_FORMAT }))
    }
}

/// Successful outcome of one executed call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    /// 204 No Content: success with nothing attached.
    NoContent,
    /// A 2xx response with a (possibly normalized) JSON body.
    Json(Value),
}

impl ApiPayload {
    /// Returns true for [`ApiPayload::NoContent`].
    #[must_use]
    pub const fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    /// Returns the JSON body, `null` for no content.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::NoContent => Value::Null,
            Self::Json(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_code_categories() {
        assert!(StatusCode::new(200).is_success());
        assert!(StatusCode::new(204).is_success());
        assert!(!StatusCode::new(404).is_success());
        assert!(StatusCode::new(401).is_unauthorized());
        assert!(!StatusCode::new(403).is_unauthorized());
    }

    #[test]
    fn test_status_code_display() {
        assert_eq!(StatusCode::new(200).to_string(), "200 OK");
        assert_eq!(StatusCode::new(422).to_string(), "422 Unprocessable Entity");
        assert_eq!(StatusCode::new(599).to_string(), "599 Unknown");
    }

    #[test]
    fn test_header_names_are_lower_cased() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = ResponseSpec::new(200, headers, vec![], Duration::ZERO);

        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert!(!response.headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_body_json_parses_valid_json() {
        let response = ResponseSpec::json(200, &json!({"id": 7}));
        assert_eq!(response.body_json(), json!({"id": 7}));
    }

    #[test]
    fn test_body_json_tolerates_malformed_body() {
        let response = ResponseSpec::new(
            502,
            HashMap::new(),
            b"<html>Bad Gateway</html>".to_vec(),
            Duration::ZERO,
        );
        assert_eq!(
            response.body_json(),
            json!({"error": "Invalid response format"})
        );
    }

    #[test]
    fn test_empty_body_is_null() {
        let response = ResponseSpec::new(200, HashMap::new(), b"  \n".to_vec(), Duration::ZERO);
        assert_eq!(response.body_json(), Value::Null);
    }

    #[test]
    fn test_payload_into_json() {
        assert_eq!(ApiPayload::NoContent.into_json(), Value::Null);
        assert!(ApiPayload::NoContent.is_no_content());
        assert_eq!(ApiPayload::Json(json!([1])).into_json(), json!([1]));
    }
}
