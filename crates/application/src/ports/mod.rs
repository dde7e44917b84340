//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod durable_store;
mod http_transport;

pub use clock::Clock;
pub use durable_store::{DurableStore, StorageChange, StorageError};
pub use http_transport::{HttpTransport, TransportError, TransportFuture, TransportRequest};
