//! Harbor Domain - Core types
//!
//! This crate defines the domain model for the Harbor platform client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod id;
pub mod request;
pub mod response;

pub use auth::{LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, token_preview};
pub use entity::{
    Address, Investment, InvestmentDraft, InvestmentStatus, LinkBankAccount, LinkToken,
    PaymentMethod, ProfileUpdate, RejectInvestment, TrustedContact, User,
};
pub use envelope::{ApiEnvelope, FieldError, error_message, field_errors};
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use request::{ApiRequest, HttpMethod, resource_path};
pub use response::{ApiPayload, INVALID_RESPONSE_FORMAT, ResponseSpec, StatusCode};
