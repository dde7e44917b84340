//! Harbor Application - Session and request orchestration
//!
//! This crate contains the client core for the Harbor investment platform:
//! the token store, the request executor with refresh-and-replay on 401, the
//! request coalescer and the named platform operations. All I/O goes through
//! the ports in [`ports`].

pub mod client;
pub mod config;
pub mod error;
pub mod operations;
pub mod ports;
pub mod session;

#[cfg(test)]
mod test_support;

pub use client::{Coalescer, RequestExecutor};
pub use config::{ApiTarget, ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, ApiResultExt, SESSION_EXPIRED_MESSAGE, payload_envelope};
pub use operations::HarborClient;
pub use ports::{
    Clock, DurableStore, HttpTransport, StorageChange, StorageError, TransportError,
    TransportFuture, TransportRequest,
};
pub use session::{SessionStatus, TokenStore};
