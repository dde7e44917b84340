//! The uniform `{success, ...}` result shape handed to UI code, and the
//! rules for reading error bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::StatusCode;

/// Uniform result of every operation, as seen by the presentation layer.
///
/// `success: true` carries `data` (absent for no-content responses);
/// `success: false` carries `error` and, when the backend sent one, the raw
/// `detail` body and `status_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    /// Discriminant
    pub success: bool,
    /// Payload on success; a unit or `null` payload is left out
    #[serde(default, skip_serializing_if = "is_absent")]
    pub data: Option<T>,
    /// Message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured error body (field-level validation errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    /// HTTP status of the failed call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl<T> ApiEnvelope<T> {
    /// Success carrying `data`.
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            detail: None,
            status_code: None,
        }
    }

    /// Success with nothing attached: serializes as `{"success": true}`.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            detail: None,
            status_code: None,
        }
    }

    /// Failure with a message and optional structured detail.
    #[must_use]
    pub fn failure(
        error: impl Into<String>,
        detail: Option<Value>,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            detail,
            status_code,
        }
    }
}

/// A success without content is `{"success": true}` whatever the operation's
/// return type, so `()` and `null` payloads are not written.
#[allow(clippy::ref_option)]
fn is_absent<T: Serialize>(data: &Option<T>) -> bool {
    data.as_ref()
        .is_none_or(|data| serde_json::to_value(data).is_ok_and(|v| v.is_null()))
}

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Backend field name (last element of `loc`), or `"__all__"`
    pub field: String,
    /// Human readable message
    pub message: String,
}

/// Picks the user-facing message from an error body.
///
/// Checked in order: `detail`, `error`, `message`; falls back to
/// `"API error: <status>"`. A `detail` list of `{loc, msg}` items is joined
/// with `"; "`.
#[must_use]
pub fn error_message(body: &Value, status: StatusCode) -> String {
    let from_detail = match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").or_else(|| item.get("message")))
                .filter_map(Value::as_str)
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    };

    from_detail
        .or_else(|| non_empty_str(body, "error"))
        .or_else(|| non_empty_str(body, "message"))
        .unwrap_or_else(|| format!("API error: {}", status.as_u16()))
}

/// Extracts field-level errors from an error body.
///
/// Understands `{"detail": [{"loc": ["body", "email"], "msg": "..."}]}` and
/// `{"errors": {"email": ["...", "..."]}}` / `{"errors": {"email": "..."}}`.
#[must_use]
pub fn field_errors(body: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Some(Value::Array(items)) = body.get("detail") {
        for item in items {
            let Some(message) = item
                .get("msg")
                .or_else(|| item.get("message"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            let field = item
                .get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| loc.last())
                .map_or_else(
                    || "__all__".to_string(),
                    |last| match last {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                );
            errors.push(FieldError {
                field,
                message: message.to_string(),
            });
        }
    }

    if let Some(Value::Object(map)) = body.get("errors") {
        for (field, value) in map {
            match value {
                Value::String(message) => errors.push(FieldError {
                    field: field.clone(),
                    message: message.clone(),
                }),
                Value::Array(messages) => {
                    errors.extend(messages.iter().filter_map(Value::as_str).map(|message| {
                        FieldError {
                            field: field.clone(),
                            message: message.to_string(),
                        }
                    }));
                }
                _ => {}
            }
        }
    }

    errors
}

fn non_empty_str(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_message_precedence() {
        let status = StatusCode::new(400);
        assert_eq!(
            error_message(&json!({"detail": "d", "error": "e", "message": "m"}), status),
            "d"
        );
        assert_eq!(error_message(&json!({"error": "e", "message": "m"}), status), "e");
        assert_eq!(error_message(&json!({"message": "m"}), status), "m");
        assert_eq!(error_message(&json!({}), status), "API error: 400");
        assert_eq!(error_message(&Value::Null, StatusCode::new(503)), "API error: 503");
        assert_eq!(error_message(&json!({"detail": ""}), status), "API error: 400");
    }

    #[test]
    fn test_detail_list_message() {
        let body = json!({"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email"},
            {"loc": ["body", "password"], "msg": "too short"}
        ]});
        assert_eq!(
            error_message(&body, StatusCode::new(422)),
            "value is not a valid email; too short"
        );
    }

    #[test]
    fn test_field_errors_from_detail_list() {
        let body = json!({"detail": [
            {"loc": ["body", "email"], "msg": "invalid"},
            {"loc": ["body", "beneficiaries", 0], "msg": "missing"},
            {"msg": "general"}
        ]});
        assert_eq!(
            field_errors(&body),
            vec![
                FieldError { field: "email".to_string(), message: "invalid".to_string() },
                FieldError { field: "0".to_string(), message: "missing".to_string() },
                FieldError { field: "__all__".to_string(), message: "general".to_string() },
            ]
        );
    }

    #[test]
    fn test_field_errors_from_errors_map() {
        let body = json!({"errors": {"zip": "invalid ZIP", "phone": ["too short", "digits only"]}});
        let errors = field_errors(&body);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "zip" && e.message == "invalid ZIP"));
        assert_eq!(errors.iter().filter(|e| e.field == "phone").count(), 2);
    }

    #[test]
    fn test_empty_envelope_serializes_to_success_only() {
        let envelope: ApiEnvelope<Value> = ApiEnvelope::empty();
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"success": true}));
    }

    #[test]
    fn test_unit_and_null_payloads_are_left_out() {
        assert_eq!(
            serde_json::to_value(ApiEnvelope::success(())).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(ApiEnvelope::success(Value::Null)).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(ApiEnvelope::success(json!([]))).unwrap(),
            json!({"success": true, "data": []})
        );
    }

    #[test]
    fn test_failure_envelope() {
        let envelope: ApiEnvelope<()> =
            ApiEnvelope::failure("bad", Some(json!({"detail": "bad"})), Some(400));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": false, "error": "bad", "detail": {"detail": "bad"}, "statusCode": 400})
        );
    }
}
