//! Request correlation ids.

use uuid::Uuid;

/// Generates a time-ordered UUID v7 used as the `X-Request-Id` of a call.
#[must_use]
pub fn generate_id() -> Uuid {
    Uuid::now_v7()
}
