//! Platform entities and their wire normalization.
//!
//! The backend is inconsistent about envelopes (`{"user": {...}}` vs a bare
//! object) and casing (`first_name` vs `firstName`). Each entity has one
//! `from_wire` function that accepts every observed shape and produces a fixed
//! type. Fields this client does not model are kept in `extra`.

mod investment;
mod payment;
mod user;
mod wire;

pub use investment::{Investment, InvestmentDraft, InvestmentStatus, RejectInvestment};
pub use payment::{LinkBankAccount, LinkToken, PaymentMethod};
pub use user::{Address, ProfileUpdate, TrustedContact, User};
pub use wire::{unwrap_envelope, unwrap_list};
