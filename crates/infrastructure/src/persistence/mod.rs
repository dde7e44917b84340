//! Durable store implementations for session state.

mod file_store;
mod memory_store;

pub use file_store::{FileDurableStore, SESSION_SCHEMA_VERSION};
pub use memory_store::MemoryDurableStore;
