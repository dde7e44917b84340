//! Login, registration and token-exchange payloads.

use serde::{Deserialize, Serialize};

/// Body of the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl LoginRequest {
    /// Creates a login body.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of the refresh endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The durable refresh credential
    pub refresh_token: String,
}

impl std::fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Body of the registration endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegisterRequest {
    /// Account email
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Phone number as entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Individual, joint, entity or IRA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

impl RegisterRequest {
    /// Creates a registration body with only the required fields.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("account_type", &self.account_type)
            .finish_non_exhaustive()
    }
}

/// Token pair returned by login, registration and refresh.
///
/// Every field is optional on the wire: refresh may not rotate the refresh
/// token, and a missing access token must be detected rather than fail
/// deserialization.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenResponse {
    /// Short-lived bearer credential
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
    /// Long-lived refresh credential, absent when not rotated
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    /// Usually "bearer"
    #[serde(default, alias = "tokenType")]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &self.access_token.as_deref().map(token_preview))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(token_preview),
            )
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Preview of a credential for logs: first 8 chars + `...`.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}
