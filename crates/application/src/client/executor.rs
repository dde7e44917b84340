//! Request executor
//!
//! Sends one logical call, attaching the bearer token, and recovers from an
//! expired access token by refreshing once and replaying the call.

use std::sync::Arc;
use std::time::Instant;

use harbor_domain::{ApiPayload, ApiRequest, ResponseSpec, StatusCode, error_message};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::coalescer::Coalescer;
use super::endpoints::is_credential_route;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::ports::{HttpTransport, TransportRequest};
use crate::session::TokenStore;

/// Executes API requests with bearer auth and refresh-on-401.
///
/// Clones share the transport, the token store and the refresh single-flight.
#[derive(Clone)]
pub struct RequestExecutor {
    pub(super) config: Arc<ClientConfig>,
    pub(super) transport: Arc<dyn HttpTransport>,
    pub(super) tokens: TokenStore,
    pub(super) refresh: Coalescer<String>,
}

impl RequestExecutor {
    /// Creates an executor over the given transport and token store.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        tokens: TokenStore,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            tokens,
            refresh: Coalescer::new(),
        }
    }

    /// The token store this executor reads bearer tokens from.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Executes the request.
    ///
    /// A 401 on a non-credential route with a refresh token available triggers
    /// one refresh and one replay. A 204 yields [`ApiPayload::NoContent`].
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] for a non-2xx response
    /// - [`ApiError::SessionExpired`] if the refresh triggered by a 401 failed
    /// - [`ApiError::Network`] / [`ApiError::Timeout`] when no response arrived
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<ApiPayload> {
        request.validate()?;
        self.tokens.ensure_loaded().await?;

        let credential_route = is_credential_route(request.route());
        let bearer = if credential_route {
            None
        } else {
            self.tokens.access_token().await
        };

        let response = self.send_once(&request, bearer.as_deref()).await?;
        let response = if response.status.is_unauthorized() && !credential_route {
            self.recover_unauthorized(&request, bearer, response).await?
        } else {
            response
        };

        Self::into_payload(response)
    }

    /// Executes the request and decodes the JSON payload into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute`], plus [`ApiError::Serialization`] if the
    /// payload does not match `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let payload = self.execute(request).await?;
        serde_json::from_value(payload.into_json())
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    async fn recover_unauthorized(
        &self,
        request: &ApiRequest,
        used_bearer: Option<String>,
        response: ResponseSpec,
    ) -> ApiResult<ResponseSpec> {
        let current = self.tokens.access_token().await;
        if current.is_some() && current != used_bearer {
            debug!(path = %request.route(), "Replaying with access token refreshed concurrently");
            let replay = self.send_once(request, current.as_deref()).await?;
            return Ok(self.after_replay(replay).await);
        }

        if self.tokens.refresh_token().await.is_none() {
            return Ok(response);
        }

        let access_token = match self.refresh_session().await {
            Ok(token) => token,
            Err(error) => {
                warn!(path = %request.route(), error = %error, "Refresh after 401 failed");
                return Err(ApiError::SessionExpired);
            }
        };

        let replay = self.send_once(request, Some(&access_token)).await?;
        Ok(self.after_replay(replay).await)
    }

    async fn after_replay(&self, replay: ResponseSpec) -> ResponseSpec {
        if replay.status.is_unauthorized() {
            warn!("Replay rejected with 401, dropping access token");
            self.tokens.invalidate_access_token().await;
        }
        replay
    }

    /// Sends the request exactly once, without any 401 handling.
    pub(super) async fn send_once(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> ApiResult<ResponseSpec> {
        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        let timeout = self.config.request_timeout;
        let transport_request = TransportRequest {
            method: request.method,
            url: self.config.resolve_url(&request.path),
            headers: self.build_headers(request, bearer),
            body,
            timeout: Some(timeout),
        };

        debug!(
            method = %request.method,
            path = %request.route(),
            request_id = %request.id,
            authenticated = bearer.is_some(),
            "Sending request"
        );
        let started = Instant::now();
        let result = tokio::time::timeout(timeout, self.transport.send(transport_request)).await;

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                warn!(path = %request.route(), error = %error, "Transport failure");
                return Err(error.into());
            }
            Err(_) => {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(path = %request.route(), timeout_ms, "Request timed out");
                return Err(ApiError::Timeout { timeout_ms });
            }
        };

        debug!(
            path = %request.route(),
            status = response.status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Received response"
        );
        Ok(response)
    }

    fn build_headers(&self, request: &ApiRequest, bearer: Option<&str>) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Request-Id".to_string(), request.id.to_string()),
        ];
        if request.body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(user_agent) = &self.config.user_agent {
            headers.push(("User-Agent".to_string(), user_agent.clone()));
        }
        if let Some(token) = bearer {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        // Caller headers replace defaults with the same name.
        headers.retain(|(name, _)| !request.has_header(name));
        headers.extend(request.headers.iter().cloned());
        headers
    }

    /// Normalizes a raw response into a payload or an HTTP error.
    pub(super) fn into_payload(response: ResponseSpec) -> ApiResult<ApiPayload> {
        if response.status == StatusCode::NO_CONTENT {
            return Ok(ApiPayload::NoContent);
        }

        let body = response.body_json();
        if response.status.is_success() {
            Ok(ApiPayload::Json(body))
        } else {
            Err(ApiError::Http {
                status: response.status,
                message: error_message(&body, response.status),
                body,
            })
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}
