//! Linked bank accounts and the Plaid link handshake.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire::{decode, decode_list, id_string};
use crate::error::DomainResult;

/// A funding source linked to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Backend identifier
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Kind of source, usually "bank_account"
    #[serde(default, rename = "type", alias = "kind", alias = "methodType")]
    pub kind: Option<String>,
    /// Bank display name
    #[serde(default, alias = "institutionName", alias = "bank_name")]
    pub institution_name: Option<String>,
    /// Account nickname
    #[serde(default, alias = "accountName")]
    pub account_name: Option<String>,
    /// Last digits of the account number
    #[serde(default, alias = "mask", alias = "last4", alias = "accountMask")]
    pub account_mask: Option<String>,
    /// Whether new investments default to this source
    #[serde(default, alias = "isDefault")]
    pub is_default: bool,
    /// Verification state reported by the backend
    #[serde(default)]
    pub status: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PaymentMethod {
    /// Normalizes `{"payment_method": {...}}` or a bare object.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is missing.
    pub fn from_wire(value: Value) -> DomainResult<Self> {
        decode(value, "payment method", "payment_method")
    }

    /// Normalizes `[...]`, `{"payment_methods": [...]}` or `{"paymentMethods": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a list or an item is invalid.
    pub fn list_from_wire(value: Value) -> DomainResult<Vec<Self>> {
        decode_list(
            value,
            "payment method",
            "payment_method",
            &["payment_methods", "paymentMethods"],
        )
    }

    /// "Chase ••1234" style label.
    #[must_use]
    pub fn label(&self) -> String {
        let bank = self
            .institution_name
            .as_deref()
            .or(self.account_name.as_deref())
            .unwrap_or("Bank account");
        match &self.account_mask {
            Some(mask) => format!("{bank} ••{mask}"),
            None => bank.to_string(),
        }
    }
}

/// Short-lived token used to open the Plaid Link widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkToken {
    /// The token handed to Plaid Link
    #[serde(alias = "linkToken")]
    pub link_token: String,
    /// Expiry as sent by the backend
    #[serde(default)]
    pub expiration: Option<String>,
}

impl LinkToken {
    /// Normalizes the link-token response.
    ///
    /// # Errors
    ///
    /// Returns an error if `link_token` is missing.
    pub fn from_wire(value: Value) -> DomainResult<Self> {
        decode(value, "link token", "link")
    }
}

/// Body sent after Plaid Link succeeds.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBankAccount {
    /// Public token from Plaid Link
    pub public_token: String,
    /// Selected account within the institution
    pub account_id: String,
}

impl std::fmt::Debug for LinkBankAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkBankAccount")
            .field("public_token", &crate::auth::token_preview(&self.public_token))
            .field("account_id", &self.account_id)
            .finish()
    }
}
