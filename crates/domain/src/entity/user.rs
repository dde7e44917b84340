//! Account holder, profile updates and trusted contact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire::{decode, decode_list, id_string};
use crate::error::DomainResult;

/// Postal address as stored on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    /// First street line
    #[serde(default, alias = "street", alias = "address1", alias = "addressLine1")]
    pub street1: Option<String>,
    /// Second street line
    #[serde(default, alias = "address2", alias = "addressLine2")]
    pub street2: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// State or region
    #[serde(default)]
    pub state: Option<String>,
    /// ZIP / postal code
    #[serde(default, alias = "zip_code", alias = "zipCode", alias = "postal_code")]
    pub zip: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
}

/// The authenticated account holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier, numeric ids are stringified
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Login email
    #[serde(default)]
    pub email: String,
    /// Given name
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    /// Phone number as stored
    #[serde(default, alias = "phoneNumber", alias = "phone")]
    pub phone_number: Option<String>,
    /// ISO date of birth
    #[serde(default, alias = "dateOfBirth", alias = "dob")]
    pub date_of_birth: Option<String>,
    /// Mailing address
    #[serde(default)]
    pub address: Option<Address>,
    /// Individual, joint, entity or IRA
    #[serde(default, alias = "accountType")]
    pub account_type: Option<String>,
    /// KYC review state reported by the backend
    #[serde(default, alias = "kycStatus")]
    pub kyc_status: Option<String>,
    /// Whether the account can reach admin operations
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
    /// Whether the email has been verified
    #[serde(default, alias = "isVerified")]
    pub is_verified: bool,
    /// Creation timestamp as sent by the backend
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl User {
    /// Normalizes a `{"user": {...}}` envelope or a bare user object.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload has no usable `id`.
    pub fn from_wire(value: Value) -> DomainResult<Self> {
        decode(value, "user", "user")
    }

    /// Normalizes a list of users (`[...]` or `{"users": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a list or an item is invalid.
    pub fn list_from_wire(value: Value) -> DomainResult<Vec<Self>> {
        decode_list(value, "user", "user", &["users"])
    }

    /// "First Last", falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Partial profile update; `None` fields are not sent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileUpdate {
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// ISO date of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Social security number, only sent during KYC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    /// Mailing address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl ProfileUpdate {
    /// Returns true if nothing would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.date_of_birth.is_none()
            && self.ssn.is_none()
            && self.address.is_none()
    }
}

impl std::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone_number", &self.phone_number)
            .field("date_of_birth", &self.date_of_birth)
            .field("ssn", &self.ssn.as_ref().map(|_| "<redacted>"))
            .field("address", &self.address)
            .finish()
    }
}

/// Person the platform may contact about the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrustedContact {
    /// Given name
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone
    #[serde(default, alias = "phone_number", alias = "phoneNumber")]
    pub phone: Option<String>,
    /// Relationship to the account holder
    #[serde(default)]
    pub relationship: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TrustedContact {
    /// Normalizes `{"trusted_contact": {...}}`, `{"trustedContact": {...}}` or
    /// a bare object. A `null` payload means no contact on file.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object.
    pub fn from_wire(value: Value) -> DomainResult<Option<Self>> {
        let value = super::unwrap_envelope(value, "trustedContact");
        match value {
            Value::Null => Ok(None),
            Value::Object(ref map)
                if map.get("trusted_contact").is_some_and(Value::is_null) =>
            {
                Ok(None)
            }
            other => decode(other, "trusted contact", "trusted_contact").map(Some),
        }
    }
}
