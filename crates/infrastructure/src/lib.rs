//! Harbor Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus environment configuration.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;

pub use adapters::{ReqwestTransport, SystemClock};
pub use config::{Settings, from_env, from_lookup};
pub use persistence::{FileDurableStore, MemoryDurableStore, SESSION_SCHEMA_VERSION};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
