//! Admin review of users and investments.

use harbor_domain::{
    ApiRequest, DomainError, Investment, InvestmentStatus, RejectInvestment, User, resource_path,
};

use super::{HarborClient, normalize};
use crate::client::endpoints::{ADMIN_INVESTMENTS, ADMIN_USERS, APPROVE_SUFFIX, REJECT_SUFFIX};
use crate::error::ApiResult;

impl HarborClient {
    /// Lists every user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Http`] with status 403 for non-admins.
    pub async fn admin_list_users(&self) -> ApiResult<Vec<User>> {
        normalize(User::list_from_wire(self.fetch(ApiRequest::get(ADMIN_USERS)).await?))
    }

    /// Lists investments, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Http`] with status 403 for non-admins.
    pub async fn admin_list_investments(
        &self,
        status: Option<&InvestmentStatus>,
    ) -> ApiResult<Vec<Investment>> {
        let path = match status {
            Some(status) => {
                let query = serde_urlencoded::to_string(&[("status", status.as_str())])
                    .map_err(|e| DomainError::InvalidPath(e.to_string()))?;
                format!("{ADMIN_INVESTMENTS}?{query}")
            }
            None => ADMIN_INVESTMENTS.to_string(),
        };
        normalize(Investment::list_from_wire(self.fetch(ApiRequest::get(path)).await?))
    }

    /// Approves a pending investment.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    pub async fn admin_approve_investment(&self, id: &str) -> ApiResult<Investment> {
        let path = resource_path(ADMIN_INVESTMENTS, id, APPROVE_SUFFIX)?;
        let payload = self.execute(ApiRequest::post(path)).await?;
        self.investment_or_reload(ADMIN_INVESTMENTS, id, payload).await
    }

    /// Rejects a pending investment with a reason shown to the investor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::InvalidRequest`] for a blank reason, or the
    /// request error.
    pub async fn admin_reject_investment(&self, id: &str, reason: &str) -> ApiResult<Investment> {
        if reason.trim().is_empty() {
            let error = DomainError::InvalidBody("rejection reason is required".to_string());
            return Err(error.into());
        }
        let path = resource_path(ADMIN_INVESTMENTS, id, REJECT_SUFFIX)?;
        let body = RejectInvestment {
            reason: reason.trim().to_string(),
        };
        let payload = self.execute(ApiRequest::post(path).with_json(&body)?).await?;
        self.investment_or_reload(ADMIN_INVESTMENTS, id, payload).await
    }
}
