//! Session state for the platform client.
//!
//! This module provides:
//! - The token store: memory-only access token, durable refresh token
//! - Reconciliation with other client instances sharing the durable store
//! - Session status for display

pub mod keys;
mod token_store;

pub use token_store::{SessionStatus, TokenStore};
