//! Profile and trusted contact of the signed-in user.

use harbor_domain::{ApiRequest, DomainError, ProfileUpdate, StatusCode, TrustedContact, User};
use tracing::warn;

use super::{FETCH_CURRENT_PROFILE, HarborClient, normalize};
use crate::client::endpoints::{CURRENT_USER, TRUSTED_CONTACT};
use crate::error::{ApiError, ApiResult};

impl HarborClient {
    /// Fetches the signed-in user's profile.
    ///
    /// Concurrent callers share one request. The user id is recorded in the
    /// durable store for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns the request error, shared by every concurrent caller.
    pub async fn get_current_user(&self) -> ApiResult<User> {
        let client = self.clone();
        self.current_user
            .coalesce(FETCH_CURRENT_PROFILE, move || async move {
                client.fetch_current_user().await
            })
            .await
    }

    async fn fetch_current_user(&self) -> ApiResult<User> {
        let user = normalize(User::from_wire(self.fetch(ApiRequest::get(CURRENT_USER)).await?))?;
        if let Err(error) = self.tokens().set_current_user_id(&user.id).await {
            warn!(error = %error, "Failed to record current user id");
        }
        Ok(user)
    }

    /// Updates profile fields; `None` fields are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an empty update and
    /// [`ApiError::Http`] with field detail on validation errors.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        if update.is_empty() {
            let error = DomainError::InvalidBody("profile update has no fields".to_string());
            return Err(error.into());
        }
        let request = ApiRequest::put(CURRENT_USER).with_json(update)?;
        normalize(User::from_wire(self.fetch(request).await?))
    }

    /// Fetches the trusted contact, `None` when none is on file.
    ///
    /// # Errors
    ///
    /// Returns the request error; a 404 is not an error.
    pub async fn get_trusted_contact(&self) -> ApiResult<Option<TrustedContact>> {
        match self.fetch(ApiRequest::get(TRUSTED_CONTACT)).await {
            Ok(payload) => normalize(TrustedContact::from_wire(payload)),
            Err(ApiError::Http { status, .. }) if status == StatusCode::new(404) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Creates or replaces the trusted contact.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] with field detail on validation errors.
    pub async fn update_trusted_contact(
        &self,
        contact: &TrustedContact,
    ) -> ApiResult<TrustedContact> {
        let request = ApiRequest::put(TRUSTED_CONTACT).with_json(contact)?;
        let saved = normalize(TrustedContact::from_wire(self.fetch(request).await?))?;
        Ok(saved.unwrap_or_else(|| contact.clone()))
    }
}
