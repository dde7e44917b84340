//! Sign-in, sign-up and sign-out.

use harbor_domain::entity::unwrap_envelope;
use harbor_domain::{ApiRequest, LoginRequest, RegisterRequest, TokenResponse};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::HarborClient;
use crate::client::endpoints::{LOGIN, LOGOUT, REGISTER};
use crate::error::{ApiError, ApiResult};

impl HarborClient {
    /// Exchanges credentials for a token pair and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] for rejected credentials and
    /// [`ApiError::MissingAccessToken`] if the response carries no token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        let request = ApiRequest::post(LOGIN).with_json(&LoginRequest::new(email, password))?;
        let tokens = token_response(self.fetch(request).await?)?;
        self.store_tokens(&tokens).await?;
        info!("Signed in");
        Ok(tokens)
    }

    /// Creates an account.
    ///
    /// The email is remembered for the verification step. When the backend
    /// signs the new user in right away, the returned tokens are stored.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] with field-level detail on validation errors.
    pub async fn register(&self, registration: &RegisterRequest) -> ApiResult<TokenResponse> {
        let request = ApiRequest::post(REGISTER).with_json(registration)?;
        let tokens = token_response(self.fetch(request).await?)?;

        self.tokens().set_signup_email(&registration.email).await?;
        if tokens.access_token.is_some() {
            self.store_tokens(&tokens).await?;
            info!("Registered and signed in");
        } else {
            info!("Registered, awaiting verification");
        }
        Ok(tokens)
    }

    /// Signs out: revokes the refresh token server side, then clears the
    /// local session whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local session keys cannot be removed.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(error) = self.tokens().ensure_loaded().await {
            warn!(error = %error, "Could not read stored session before logout");
        }
        if let Some(refresh_token) = self.tokens().refresh_token().await {
            let request =
                ApiRequest::post(LOGOUT).with_body(json!({ "refresh_token": refresh_token }));
            if let Err(error) = self.executor().execute(request).await {
                warn!(error = %error, "Server-side logout failed");
            }
        }
        self.tokens().clear_tokens().await?;
        info!("Signed out");
        Ok(())
    }

    /// Refreshes the session now instead of waiting for a 401.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NoRefreshToken`] without a refresh token, or the
    /// exchange failure (the session is cleared in that case).
    pub async fn refresh_session(&self) -> ApiResult<()> {
        self.executor().refresh_session().await.map(|_| ())
    }

    /// True iff an access token is held in memory.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens().is_authenticated().await
    }

    async fn store_tokens(&self, tokens: &TokenResponse) -> ApiResult<()> {
        let access_token = tokens
            .access_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingAccessToken)?;
        self.tokens()
            .set_tokens_with_expiry(access_token, tokens.refresh_token.clone(), tokens.expires_in)
            .await?;
        Ok(())
    }
}

fn token_response(payload: Value) -> ApiResult<TokenResponse> {
    if payload.is_null() {
        return Ok(TokenResponse::default());
    }
    serde_json::from_value(unwrap_envelope(payload, "tokens"))
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::operations::tests::{client, signed_in};
    use crate::ports::TransportError;
    use crate::session::SessionStatus;
    use crate::session::keys::{CURRENT_USER_ID_KEY, REFRESH_TOKEN_KEY, SIGNUP_EMAIL_KEY};
    use crate::test_support::{MemoryStore, json, no_content};
    use pretty_assertions::assert_eq;

    fn login_backend(
        request: &crate::ports::TransportRequest,
    ) -> Result<harbor_domain::ResponseSpec, TransportError> {
        match request.url.as_str() {
            LOGIN => json(
                200,
                &json!({
                    "access_token": "A1",
                    "refresh_token": "R1",
                    "token_type": "bearer",
                    "expires_in": 900
                }),
            ),
            _ => json(404, &json!({})),
        }
    }

    #[tokio::test]
    async fn test_login_keeps_access_token_in_memory() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, login_backend);

        let tokens = client.login("a@b.co", "hunter22").await.unwrap();

        assert_eq!(tokens.expires_in, Some(900));
        assert!(client.is_authenticated().await);
        assert_eq!(storage.value(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
        assert!(!storage.written_values().iter().any(|v| v == "A1"));
        assert_eq!(
            transport.requests()[0].body.as_deref(),
            Some(br#"{"email":"a@b.co","password":"hunter22"}"#.as_slice())
        );
    }

    #[tokio::test]
    async fn test_second_instance_sees_refresh_token() {
        let storage = MemoryStore::new();
        let (tab_a, _) = client(&storage, login_backend);
        let (tab_b, _) = client(&storage, login_backend);

        tab_a.login("a@b.co", "hunter22").await.unwrap();
        tab_b.tokens().ensure_loaded().await.unwrap();

        assert_eq!(tab_b.tokens().refresh_token().await.as_deref(), Some("R1"));
        assert!(!tab_b.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_anonymous() {
        let storage = MemoryStore::new();
        let (client, _) = client(&storage, |_| {
            json(401, &json!({"detail": "Incorrect email or password"}))
        });

        let error = client.login("a@b.co", "nope").await.unwrap_err();

        assert_eq!(error.to_string(), "Incorrect email or password");
        assert!(!error.requires_reauthentication());
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_without_access_token_fails() {
        let storage = MemoryStore::new();
        let (client, _) = client(&storage, |_| json(200, &json!({"token_type": "bearer"})));

        let error = client.login("a@b.co", "pw").await.unwrap_err();
        assert_eq!(error, ApiError::MissingAccessToken);
        assert_eq!(storage.value(REFRESH_TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_register_remembers_email() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, |_| json(201, &json!({"message": "created"})));

        let mut registration = RegisterRequest::new("new@b.co", "Secret123!");
        registration.first_name = Some("Ada".to_string());
        let tokens = client.register(&registration).await.unwrap();

        assert_eq!(tokens.access_token, None);
        assert!(!client.is_authenticated().await);
        assert_eq!(client.tokens().signup_email().await.unwrap().as_deref(), Some("new@b.co"));
        assert_eq!(transport.requests()[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, |_| {
            Err(TransportError::ConnectionFailed("offline".to_string()))
        });
        signed_in(&client).await;
        client.tokens().set_current_user_id("42").await.unwrap();
        client.tokens().set_signup_email("a@b.co").await.unwrap();

        client.logout().await.unwrap();
        client.logout().await.unwrap();

        assert!(!client.is_authenticated().await);
        for key in [REFRESH_TOKEN_KEY, CURRENT_USER_ID_KEY, SIGNUP_EMAIL_KEY] {
            assert_eq!(storage.value(key), None);
        }
        assert_eq!(transport.count(LOGOUT), 1);
    }

    #[tokio::test]
    async fn test_logout_sends_bearer_and_refresh_token() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, |_| no_content());
        signed_in(&client).await;

        client.logout().await.unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.header("Authorization"), Some("Bearer A1"));
        assert_eq!(
            sent.body.as_deref(),
            Some(br#"{"refresh_token":"R1"}"#.as_slice())
        );
    }

    #[tokio::test]
    async fn test_fresh_instance_revokes_stored_refresh_token() {
        let storage = MemoryStore::new();
        storage.put(REFRESH_TOKEN_KEY, "R1");
        let (client, transport) = client(&storage, |_| no_content());

        client.logout().await.unwrap();

        assert_eq!(transport.count(LOGOUT), 1);
        assert_eq!(
            transport.requests()[0].body.as_deref(),
            Some(br#"{"refresh_token":"R1"}"#.as_slice())
        );
        assert_eq!(storage.value(REFRESH_TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn test_status_reads_stored_session_on_first_use() {
        let storage = MemoryStore::new();
        storage.put(REFRESH_TOKEN_KEY, "R1");
        let (client, transport) = client(&storage, |_| no_content());

        assert!(!client.tokens().is_initialized().await);
        assert_eq!(client.session_status().await, SessionStatus::RefreshOnly);
        assert!(client.tokens().is_initialized().await);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_refresh() {
        let storage = MemoryStore::new();
        let (client, _) = client(&storage, |_| json(200, &json!({"access_token": "A2"})));

        assert_eq!(
            client.refresh_session().await,
            Err(ApiError::NoRefreshToken)
        );

        signed_in(&client).await;
        client.refresh_session().await.unwrap();
        assert_eq!(client.tokens().access_token().await.as_deref(), Some("A2"));
    }
}
