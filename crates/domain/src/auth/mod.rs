//! Authentication wire types

mod types;

pub use types::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, token_preview};
