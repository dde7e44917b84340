//! Token refresh procedure.

use harbor_domain::{ApiRequest, RefreshRequest, TokenResponse};
use tracing::{info, warn};

use super::endpoints::REFRESH;
use super::executor::RequestExecutor;
use crate::error::{ApiError, ApiResult};

/// Single-flight key for the refresh exchange.
const REFRESH_KEY: &str = "refresh-session";

impl RequestExecutor {
    /// Exchanges the refresh token for a new token pair.
    ///
    /// Concurrent callers share one exchange. Returns the new access token.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NoRefreshToken`] without a refresh token; nothing is sent
    /// - any failure of the exchange, after the session has been cleared
    pub async fn refresh_session(&self) -> ApiResult<String> {
        let executor = self.clone();
        self.refresh
            .coalesce(REFRESH_KEY, move || async move {
                executor.perform_refresh().await
            })
            .await
    }

    async fn perform_refresh(&self) -> ApiResult<String> {
        self.tokens.ensure_loaded().await?;
        let Some(refresh_token) = self.tokens.refresh_token().await else {
            return Err(ApiError::NoRefreshToken);
        };

        info!("Refreshing session");
        match self.exchange(refresh_token).await {
            Ok(access_token) => {
                info!("Session refreshed");
                Ok(access_token)
            }
            Err(error) => {
                warn!(error = %error, "Session refresh failed, clearing tokens");
                if let Err(e) = self.tokens.clear_tokens().await {
                    warn!(error = %e, "Failed to clear durable session keys");
                }
                Err(error)
            }
        }
    }

    async fn exchange(&self, refresh_token: String) -> ApiResult<String> {
        let request = ApiRequest::post(REFRESH).with_json(&RefreshRequest { refresh_token })?;
        let response = self.send_once(&request, None).await?;
        let payload = Self::into_payload(response)?;

        let tokens: TokenResponse = serde_json::from_value(payload.into_json())
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let access_token = tokens
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingAccessToken)?;

        self.tokens
            .set_tokens_with_expiry(access_token.clone(), tokens.refresh_token, tokens.expires_in)
            .await?;
        Ok(access_token)
    }
}
