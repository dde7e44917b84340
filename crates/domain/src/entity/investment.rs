//! Investments and their draft/submit lifecycle as seen by the client.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire::{amount, decode, decode_list, id_string, opt_id_string};
use crate::error::DomainResult;

/// Review state of an investment. Unknown states are preserved as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    /// Being edited by the investor
    #[default]
    Draft,
    /// Submitted, waiting for admin review
    #[serde(alias = "pending_approval", alias = "submitted")]
    Pending,
    /// Approved by an admin
    Approved,
    /// Rejected by an admin
    Rejected,
    /// Funded and earning
    Active,
    /// Closed out
    Withdrawn,
    /// Anything this client does not know about
    #[serde(untagged)]
    Other(String),
}

impl InvestmentStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Active => "active",
            Self::Withdrawn => "withdrawn",
            Self::Other(other) => other,
        }
    }

    /// Only drafts may be edited, deleted or submitted.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for InvestmentStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Self::Draft,
            "pending" | "pending_approval" | "submitted" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            "active" => Self::Active,
            "withdrawn" => Self::Withdrawn,
            _ => Self::Other(value.to_string()),
        }
    }
}

/// An investment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    /// Backend identifier
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Owning user
    #[serde(default, alias = "userId", deserialize_with = "opt_id_string")]
    pub user_id: Option<String>,
    /// Principal amount in dollars
    #[serde(deserialize_with = "amount")]
    pub amount: f64,
    /// Current review state
    #[serde(default)]
    pub status: InvestmentStatus,
    /// Individual, joint, entity or IRA
    #[serde(default, alias = "accountType")]
    pub account_type: Option<String>,
    /// Monthly or compounding
    #[serde(default, alias = "paymentFrequency")]
    pub payment_frequency: Option<String>,
    /// Lockup term, e.g. "1-year"
    #[serde(default, alias = "lockupPeriod")]
    pub lockup_period: Option<String>,
    /// Funding source
    #[serde(
        default,
        alias = "paymentMethodId",
        deserialize_with = "opt_id_string"
    )]
    pub payment_method_id: Option<String>,
    /// Creation timestamp as sent by the backend
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    /// Last update timestamp as sent by the backend
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
    /// Submission timestamp as sent by the backend
    #[serde(default, alias = "submittedAt")]
    pub submitted_at: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Investment {
    /// Normalizes `{"investment": {...}}` or a bare investment object.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` or `amount` is missing or malformed.
    pub fn from_wire(value: Value) -> DomainResult<Self> {
        decode(value, "investment", "investment")
    }

    /// Normalizes a list of investments (`[...]` or `{"investments": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a list or an item is invalid.
    pub fn list_from_wire(value: Value) -> DomainResult<Vec<Self>> {
        decode_list(value, "investment", "investment", &["investments"])
    }
}

/// Fields an investor fills in while drafting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InvestmentDraft {
    /// Principal amount in dollars
    pub amount: f64,
    /// Individual, joint, entity or IRA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Monthly or compounding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_frequency: Option<String>,
    /// Lockup term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockup_period: Option<String>,
    /// Funding source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

impl InvestmentDraft {
    /// Creates a draft with only the amount set.
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }
}

/// Body of the admin reject endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectInvestment {
    /// Reason shown to the investor
    pub reason: String,
}
