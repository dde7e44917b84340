//! HTTP Response domain types

mod spec;

pub use spec::{ApiPayload, INVALID_RESPONSE_FORMAT, ResponseSpec, StatusCode};
