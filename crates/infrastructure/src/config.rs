//! Environment-based configuration.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `HARBOR_API_URL` | Backend base URL, or `same-origin` | `http://localhost:8000` |
//! | `HARBOR_TIMEOUT_MS` | Per-request timeout in milliseconds | `30000` |
//! | `HARBOR_STORAGE_PATH` | Session file location | `<config_dir>/harbor/session.json` |

use std::path::PathBuf;
use std::time::Duration;

use harbor_application::config::DEFAULT_API_URL;
use harbor_application::{ApiTarget, ClientConfig, ConfigError};

use crate::persistence::FileDurableStore;

/// Base URL variable.
pub const API_URL_VAR: &str = "HARBOR_API_URL";
/// Timeout variable.
pub const TIMEOUT_MS_VAR: &str = "HARBOR_TIMEOUT_MS";
/// Session file variable.
pub const STORAGE_PATH_VAR: &str = "HARBOR_STORAGE_PATH";

const SAME_ORIGIN: &str = "same-origin";

/// Everything the binary needs to wire a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Client configuration
    pub client: ClientConfig,
    /// Session file location, `None` when the platform has no config dir
    pub storage_path: Option<PathBuf>,
}

/// Reads settings from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] for an unparsable URL or timeout.
pub fn from_env() -> Result<Settings, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Reads settings through `lookup`, which maps a variable name to its value.
///
/// # Errors
///
/// Returns a [`ConfigError`] for an unparsable URL or timeout.
pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let target = match value(API_URL_VAR) {
        Some(url) if url.eq_ignore_ascii_case(SAME_ORIGIN) => ApiTarget::SameOrigin,
        Some(url) => ApiTarget::absolute(&url)?,
        None => ApiTarget::absolute(DEFAULT_API_URL)?,
    };
    let mut client = ClientConfig::new(target);

    if let Some(raw) = value(TIMEOUT_MS_VAR) {
        let millis = raw
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                name: TIMEOUT_MS_VAR.to_string(),
                value: raw.clone(),
            })?;
        client = client.with_request_timeout(Duration::from_millis(millis));
    }

    let storage_path = value(STORAGE_PATH_VAR)
        .map(PathBuf::from)
        .or_else(FileDurableStore::default_path);

    Ok(Settings {
        client,
        storage_path,
    })
}
