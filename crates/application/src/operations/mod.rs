//! Named platform operations.
//!
//! Each operation is a fixed method, path and body on the
//! [`RequestExecutor`] followed by one normalization function from
//! `harbor_domain::entity`.

mod admin;
mod auth;
mod investments;
mod payments;
mod user;

use std::sync::Arc;

use harbor_domain::{ApiPayload, ApiRequest, DomainResult, Investment, PaymentMethod, User};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::client::{Coalescer, RequestExecutor};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::ports::{Clock, DurableStore, HttpTransport};
use crate::session::{SessionStatus, TokenStore};

/// Coalescing key for the current user's profile.
pub const FETCH_CURRENT_PROFILE: &str = "fetch-current-profile";
/// Coalescing key for the payment method list.
pub const LIST_PAYMENT_METHODS: &str = "list-payment-methods";
/// Coalescing key for the investment list.
pub const LIST_INVESTMENTS: &str = "list-investments";

/// Session-scoped client for the investment platform.
///
/// Build one per running application and pass clones around; clones share
/// the session, the in-flight table and the transport.
#[derive(Clone, Debug)]
pub struct HarborClient {
    executor: RequestExecutor,
    current_user: Coalescer<User>,
    payment_methods: Coalescer<Vec<PaymentMethod>>,
    investments: Coalescer<Vec<Investment>>,
}

impl HarborClient {
    /// Wires a client from its ports.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn DurableStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenStore::new(storage, clock);
        Self::from_executor(RequestExecutor::new(config, transport, tokens))
    }

    /// Wraps an existing executor.
    #[must_use]
    pub fn from_executor(executor: RequestExecutor) -> Self {
        Self {
            executor,
            current_user: Coalescer::new(),
            payment_methods: Coalescer::new(),
            investments: Coalescer::new(),
        }
    }

    /// The underlying executor.
    #[must_use]
    pub const fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// The session token store.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        self.executor.tokens()
    }

    /// Session status for display, loading the stored session on first use.
    pub async fn session_status(&self) -> SessionStatus {
        if !self.tokens().is_initialized().await {
            if let Err(error) = self.tokens().ensure_loaded().await {
                warn!(error = %error, "Could not read stored session");
            }
        }
        self.tokens().status().await
    }

    /// Follows session changes made by other instances sharing the store.
    #[must_use]
    pub fn spawn_session_sync(&self) -> Option<JoinHandle<()>> {
        self.tokens().spawn_sync()
    }

    /// Executes an arbitrary request through the authenticated pipeline.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::execute`].
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<ApiPayload> {
        self.executor.execute(request).await
    }

    async fn fetch(&self, request: ApiRequest) -> ApiResult<Value> {
        Ok(self.executor.execute(request).await?.into_json())
    }
}

/// Maps a wire-shape failure on a successful response.
fn normalize<T>(result: DomainResult<T>) -> ApiResult<T> {
    result.map_err(|e| ApiError::Serialization(e.to_string()))
}
