//! Session token storage.
//!
//! The access token lives in memory only and dies with the process. The
//! refresh token is the single durable credential; it is written to the
//! [`DurableStore`] so other client instances (and the next start) can pick
//! the session up.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use harbor_domain::token_preview;
use tokio::sync::RwLock;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::keys::{CURRENT_USER_ID_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, SIGNUP_EMAIL_KEY};
use crate::ports::{Clock, DurableStore, StorageChange, StorageError};

/// Seconds before expiry at which the session is reported as expiring.
const EXPIRY_WARNING_SECONDS: i64 = 60;

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    initialized: bool,
}

impl SessionState {
    fn drop_access_token(&mut self) {
        self.access_token = None;
        self.expires_at = None;
    }
}

/// Thread-safe session token store.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct TokenStore {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn DurableStore>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    /// Creates an empty store backed by `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn DurableStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            storage,
            clock,
        }
    }

    /// Stores a fresh token pair.
    ///
    /// The access token stays in memory. A `None` refresh token keeps the one
    /// already held (refresh responses do not always rotate it).
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token cannot be persisted.
    pub async fn set_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Result<(), StorageError> {
        self.set_tokens_with_expiry(access_token, refresh_token, None)
            .await
    }

    /// Like [`Self::set_tokens`], also recording the access token lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token cannot be persisted.
    pub async fn set_tokens_with_expiry(
        &self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: Option<u64>,
    ) -> Result<(), StorageError> {
        let access_token = access_token.into();
        let expires_at = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| self.clock.now() + Duration::seconds(secs));

        // Held across the durable write: a concurrent reload must not read
        // the previous refresh token back into memory.
        let mut state = self.state.write().await;
        if let Some(refresh) = &refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh).await?;
        }
        debug!(
            access_token = %token_preview(&access_token),
            rotated = refresh_token.is_some(),
            "Storing session tokens"
        );
        state.access_token = Some(access_token);
        state.expires_at = expires_at;
        if refresh_token.is_some() {
            state.refresh_token = refresh_token;
        }
        state.initialized = true;
        Ok(())
    }

    /// Wipes both tokens and every session key. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable keys cannot be removed; memory is
    /// cleared regardless.
    pub async fn clear_tokens(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let removed = self.storage.remove_many(&SESSION_KEYS).await;
        state.drop_access_token();
        state.refresh_token = None;
        state.initialized = true;
        info!("Session cleared");
        removed
    }

    /// Reconciles the in-memory refresh token with the durable store.
    ///
    /// Run before every request so a logout or rotation done by another
    /// instance is picked up.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store cannot be read.
    pub async fn ensure_loaded(&self) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let durable = self.storage.get(REFRESH_TOKEN_KEY).await?;
        reconcile(&mut state, durable);
        Ok(())
    }

    /// Applies a change observed on the durable store.
    pub async fn apply_storage_change(&self, change: &StorageChange) {
        if change.key == REFRESH_TOKEN_KEY {
            let mut state = self.state.write().await;
            reconcile(&mut state, change.new_value.clone());
        }
    }

    /// Starts a task that follows durable-store changes.
    ///
    /// Returns `None` when the store cannot report changes; [`Self::ensure_loaded`]
    /// still catches up before each request.
    #[must_use]
    pub fn spawn_sync(&self) -> Option<JoinHandle<()>> {
        let mut changes = self.storage.subscribe()?;
        let store = self.clone();
        Some(tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => store.apply_storage_change(&change).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Storage change stream lagged, reloading");
                        if let Err(e) = store.ensure_loaded().await {
                            warn!(error = %e, "Failed to reload session");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }

    /// True iff an access token is held in memory.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    /// Current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    /// Current refresh token as last seen in memory.
    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    /// True once the store has been reconciled or written at least once.
    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.initialized
    }

    /// Drops the access token, keeping the refresh token.
    pub async fn invalidate_access_token(&self) {
        self.state.write().await.drop_access_token();
    }

    /// Session status for display.
    pub async fn status(&self) -> SessionStatus {
        let state = self.state.read().await;
        match (&state.access_token, &state.refresh_token) {
            (None, None) => SessionStatus::Anonymous,
            (None, Some(_)) => SessionStatus::RefreshOnly,
            (Some(_), _) => {
                let remaining = state
                    .expires_at
                    .map(|at| (at - self.clock.now()).num_seconds().max(0));
                match remaining {
                    Some(secs) if secs <= EXPIRY_WARNING_SECONDS => SessionStatus::Expiring {
                        seconds_remaining: secs,
                    },
                    other => SessionStatus::Active {
                        seconds_remaining: other,
                    },
                }
            }
        }
    }

    /// Records the id of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    pub async fn set_current_user_id(&self, user_id: &str) -> Result<(), StorageError> {
        self.storage.set(CURRENT_USER_ID_KEY, user_id).await
    }

    /// Id of the signed-in user, if recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store cannot be read.
    pub async fn current_user_id(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(CURRENT_USER_ID_KEY).await
    }

    /// Remembers the email used during signup.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    pub async fn set_signup_email(&self, email: &str) -> Result<(), StorageError> {
        self.storage.set(SIGNUP_EMAIL_KEY, email).await
    }

    /// Email used during signup, if still pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store cannot be read.
    pub async fn signup_email(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(SIGNUP_EMAIL_KEY).await
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

fn reconcile(state: &mut SessionState, durable: Option<String>) {
    state.initialized = true;
    if state.refresh_token == durable {
        return;
    }

    if durable.is_none() {
        info!("Refresh token removed elsewhere, dropping session");
        state.drop_access_token();
    } else {
        debug!("Refresh token updated from durable storage");
    }
    state.refresh_token = durable;
}

/// Session status for UI display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No credentials at all.
    Anonymous,
    /// Only a refresh token; the next request will refresh.
    RefreshOnly,
    /// Access token held and not close to expiry.
    Active {
        /// Seconds until expiry, or None if the lifetime is unknown.
        seconds_remaining: Option<i64>,
    },
    /// Access token about to expire.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
}

impl SessionStatus {
    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Anonymous => "Not signed in".to_string(),
            Self::RefreshOnly => "Signed in (session will refresh)".to_string(),
            Self::Active {
                seconds_remaining: Some(secs),
            } => {
                if *secs > 3600 {
                    format!("Signed in for {} more hours", secs / 3600)
                } else {
                    format!("Signed in for {} more minutes", secs / 60)
                }
            }
            Self::Active {
                seconds_remaining: None,
            } => "Signed in".to_string(),
            Self::Expiring { seconds_remaining } => {
                format!("Session expiring in {seconds_remaining} seconds")
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, MemoryStore};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[tokio::test]
    async fn test_access_token_is_never_persisted() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(storage.clone(), ManualClock::new());

        store
            .set_tokens("access-abc", Some("refresh-xyz".to_string()))
            .await
            .unwrap();

        assert!(store.is_authenticated().await);
        assert_eq!(storage.value(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-xyz"));
        assert!(!storage.written_values().iter().any(|v| v.contains("access-abc")));
    }

    #[tokio::test]
    async fn test_restart_keeps_only_refresh_token() {
        let storage = MemoryStore::new();
        let first = TokenStore::new(storage.clone(), ManualClock::new());
        first
            .set_tokens("access-abc", Some("refresh-xyz".to_string()))
            .await
            .unwrap();

        let restarted = TokenStore::new(storage.clone(), ManualClock::new());
        restarted.ensure_loaded().await.unwrap();

        assert!(!restarted.is_authenticated().await);
        assert_eq!(restarted.refresh_token().await.as_deref(), Some("refresh-xyz"));
        assert_eq!(restarted.status().await, SessionStatus::RefreshOnly);
    }

    #[tokio::test]
    async fn test_clear_tokens_is_idempotent() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(storage.clone(), ManualClock::new());
        store
            .set_tokens("a", Some("r".to_string()))
            .await
            .unwrap();
        store.set_current_user_id("42").await.unwrap();
        store.set_signup_email("new@example.com").await.unwrap();

        store.clear_tokens().await.unwrap();
        store.clear_tokens().await.unwrap();

        assert!(!store.is_authenticated().await);
        assert_eq!(store.refresh_token().await, None);
        for key in SESSION_KEYS {
            assert_eq!(storage.value(key), None);
        }
    }

    #[tokio::test]
    async fn test_logout_elsewhere_drops_access_token() {
        let storage = MemoryStore::new();
        let tab_a = TokenStore::new(storage.clone(), ManualClock::new());
        let tab_b = TokenStore::new(storage.clone(), ManualClock::new());

        tab_a
            .set_tokens("a1", Some("r1".to_string()))
            .await
            .unwrap();
        tab_b.ensure_loaded().await.unwrap();
        tab_b.set_tokens("b1", None).await.unwrap();

        tab_a.clear_tokens().await.unwrap();
        tab_b.ensure_loaded().await.unwrap();

        assert!(!tab_b.is_authenticated().await);
        assert_eq!(tab_b.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_rotation_elsewhere_keeps_access_token() {
        let storage = MemoryStore::new();
        let store = TokenStore::new(storage.clone(), ManualClock::new());
        store
            .set_tokens("a1", Some("r1".to_string()))
            .await
            .unwrap();

        storage.put(REFRESH_TOKEN_KEY, "r2");
        store.ensure_loaded().await.unwrap();

        assert_eq!(store.access_token().await.as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_sync_task_follows_remote_logout() {
        let storage = MemoryStore::new();
        let local = TokenStore::new(storage.clone(), ManualClock::new());
        local
            .set_tokens("a1", Some("r1".to_string()))
            .await
            .unwrap();
        let handle = local.spawn_sync().expect("memory store reports changes");

        storage.remove(REFRESH_TOKEN_KEY).await.unwrap();
        for _ in 0..50 {
            if !local.is_authenticated().await {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(!local.is_authenticated().await);
        handle.abort();
    }

    #[tokio::test]
    async fn test_reload_during_rotation_keeps_new_refresh_token() {
        let storage = MemoryStore::with_write_delay(Duration::from_millis(20));
        storage.put(REFRESH_TOKEN_KEY, "r1");
        let store = TokenStore::new(storage.clone(), ManualClock::new());

        let reload = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.ensure_loaded().await
        };
        let (rotated, reloaded) =
            tokio::join!(store.set_tokens("a2", Some("r2".to_string())), reload);
        rotated.unwrap();
        reloaded.unwrap();

        assert_eq!(store.refresh_token().await.as_deref(), Some("r2"));
        assert_eq!(storage.value(REFRESH_TOKEN_KEY).as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_reload_during_clear_stays_signed_out() {
        let storage = MemoryStore::with_write_delay(Duration::from_millis(20));
        let store = TokenStore::new(storage.clone(), ManualClock::new());
        store
            .set_tokens("a1", Some("r1".to_string()))
            .await
            .unwrap();

        let reload = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            store.ensure_loaded().await
        };
        let (cleared, reloaded) = tokio::join!(store.clear_tokens(), reload);
        cleared.unwrap();
        reloaded.unwrap();

        assert!(!store.is_authenticated().await);
        assert_eq!(store.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_status_tracks_expiry() {
        let storage = MemoryStore::new();
        let clock = ManualClock::new();
        let store = TokenStore::new(storage, clock.clone());
        assert_eq!(store.status().await, SessionStatus::Anonymous);

        store
            .set_tokens_with_expiry("a", Some("r".to_string()), Some(900))
            .await
            .unwrap();
        assert_eq!(
            store.status().await,
            SessionStatus::Active {
                seconds_remaining: Some(900)
            }
        );

        clock.advance(870);
        assert_eq!(
            store.status().await,
            SessionStatus::Expiring {
                seconds_remaining: 30
            }
        );

        store.invalidate_access_token().await;
        assert_eq!(store.status().await, SessionStatus::RefreshOnly);
    }

    #[test]
    fn test_status_display_messages() {
        assert_eq!(SessionStatus::Anonymous.display_message(), "Not signed in");
        assert!(
            SessionStatus::Active {
                seconds_remaining: Some(7200)
            }
            .display_message()
            .contains("hours")
        );
        assert!(
            SessionStatus::Expiring {
                seconds_remaining: 30
            }
            .display_message()
            .contains("30 seconds")
        );
    }
}
