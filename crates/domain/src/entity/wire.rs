//! Envelope handling shared by every entity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Returns the object under `key` if the payload is wrapped in it,
/// otherwise the payload itself.
#[must_use]
pub fn unwrap_envelope(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extracts a list from a bare array or from the first of `keys` holding an
/// array (`{"investments": [...]}`, `{"items": [...]}`).
///
/// # Errors
///
/// Returns [`DomainError::UnexpectedPayload`] if no array is found.
pub fn unwrap_list(value: Value, entity: &'static str, keys: &[&str]) -> DomainResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => keys
            .iter()
            .chain(["items", "results", "data"].iter())
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| DomainError::UnexpectedPayload {
                entity,
                message: "expected a list".to_string(),
            }),
        Value::Null => Ok(Vec::new()),
        other => Err(DomainError::UnexpectedPayload {
            entity,
            message: format!("expected a list, got {other}"),
        }),
    }
}

/// Deserializes one entity after envelope unwrapping.
pub(crate) fn decode<T: DeserializeOwned>(
    value: Value,
    entity: &'static str,
    envelope: &str,
) -> DomainResult<T> {
    serde_json::from_value(unwrap_envelope(value, envelope))
        .map_err(|e| DomainError::payload(entity, &e))
}

/// Deserializes a list of entities.
pub(crate) fn decode_list<T: DeserializeOwned>(
    value: Value,
    entity: &'static str,
    envelope: &str,
    keys: &[&str],
) -> DomainResult<Vec<T>> {
    unwrap_list(value, entity, keys)?
        .into_iter()
        .map(|item| decode(item, entity, envelope))
        .collect()
}

/// Ids arrive as numbers from some endpoints and strings from others.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Optional variant of [`id_string`].
pub(crate) fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Amounts arrive as JSON numbers or decimal strings (`"1000.00"`).
pub(crate) fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("amount out of range")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected numeric amount, got {other}"
        ))),
    }
}
