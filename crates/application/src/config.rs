//! Client configuration

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default upper bound for one HTTP exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The API base URL cannot be parsed or cannot carry paths.
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidApiUrl {
        /// Offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// A numeric setting was not a number.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue {
        /// Setting name
        name: String,
        /// Offending value
        value: String,
    },
}

/// Where API paths are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiTarget {
    /// Paths are joined onto this base URL.
    Absolute(Url),
    /// Paths are sent as-is, relative to the page origin (proxy setups).
    SameOrigin,
}

impl ApiTarget {
    /// Parses an absolute base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the value is not an absolute
    /// http(s) URL.
    pub fn absolute(base: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            url: base.to_string(),
            reason,
        };
        let url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(invalid("expected an http or https URL".to_string()));
        }
        Ok(Self::Absolute(url))
    }

    /// Resolves an API path (`/api/...`) against this target.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        match self {
            Self::SameOrigin => path.to_string(),
            Self::Absolute(base) => {
                let base = base.as_str().trim_end_matches('/');
                format!("{base}{path}")
            }
        }
    }
}

impl Default for ApiTarget {
    fn default() -> Self {
        Url::parse(DEFAULT_API_URL).map_or(Self::SameOrigin, Self::Absolute)
    }
}

/// Settings for a [`crate::HarborClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend location
    pub target: ApiTarget,
    /// Upper bound for one HTTP exchange
    pub request_timeout: Duration,
    /// Sent as `User-Agent` when set
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration for the given target with default settings.
    #[must_use]
    pub fn new(target: ApiTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Resolves an API path to the URL handed to the transport.
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        self.target.resolve(path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: ApiTarget::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_absolute_target_joins_path() {
        let target = ApiTarget::absolute("https://api.example.com/").unwrap();
        assert_eq!(
            target.resolve("/api/users/me"),
            "https://api.example.com/api/users/me"
        );

        let target = ApiTarget::absolute("https://example.com/backend").unwrap();
        assert_eq!(
            target.resolve("/api/auth/login"),
            "https://example.com/backend/api/auth/login"
        );
    }

    #[test]
    fn test_same_origin_keeps_relative_path() {
        assert_eq!(ApiTarget::SameOrigin.resolve("/api/investments"), "/api/investments");
    }

    #[test]
    fn test_invalid_targets() {
        assert!(ApiTarget::absolute("not a url").is_err());
        assert!(ApiTarget::absolute("ftp://example.com").is_err());
        assert!(ApiTarget::absolute("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.resolve_url("/api/users/me"),
            "http://localhost:8000/api/users/me"
        );

        let config = ClientConfig::new(ApiTarget::SameOrigin)
            .with_request_timeout(Duration::from_secs(5))
            .with_user_agent("harbor-test");
        assert_eq!(config.user_agent.as_deref(), Some("harbor-test"));
        assert_eq!(config.resolve_url("/api/x"), "/api/x");
    }
}
