//! Investment drafts and their submission.

use harbor_domain::{ApiPayload, ApiRequest, Investment, InvestmentDraft, resource_path};

use super::{HarborClient, LIST_INVESTMENTS, normalize};
use crate::client::endpoints::{INVESTMENTS, SUBMIT_SUFFIX};
use crate::error::ApiResult;

impl HarborClient {
    /// Lists the signed-in user's investments. Concurrent callers share one
    /// request.
    ///
    /// # Errors
    ///
    /// Returns the request error, shared by every concurrent caller.
    pub async fn list_investments(&self) -> ApiResult<Vec<Investment>> {
        let client = self.clone();
        self.investments
            .coalesce(LIST_INVESTMENTS, move || async move {
                let payload = client.fetch(ApiRequest::get(INVESTMENTS)).await?;
                normalize(Investment::list_from_wire(payload))
            })
            .await
    }

    /// Fetches one investment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::InvalidRequest`] for an unusable id, or the
    /// request error.
    pub async fn get_investment(&self, id: &str) -> ApiResult<Investment> {
        let path = resource_path(INVESTMENTS, id, "")?;
        normalize(Investment::from_wire(self.fetch(ApiRequest::get(path)).await?))
    }

    /// Creates a draft investment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Http`] with field detail on validation errors.
    pub async fn create_investment(&self, draft: &InvestmentDraft) -> ApiResult<Investment> {
        let request = ApiRequest::post(INVESTMENTS).with_json(draft)?;
        normalize(Investment::from_wire(self.fetch(request).await?))
    }

    /// Replaces the fields of a draft investment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Http`] with field detail on validation errors.
    pub async fn update_investment(
        &self,
        id: &str,
        draft: &InvestmentDraft,
    ) -> ApiResult<Investment> {
        let request = ApiRequest::put(resource_path(INVESTMENTS, id, "")?).with_json(draft)?;
        let payload = self.execute(request).await?;
        self.investment_or_reload(INVESTMENTS, id, payload).await
    }

    /// Deletes a draft investment.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    pub async fn delete_investment(&self, id: &str) -> ApiResult<()> {
        let path = resource_path(INVESTMENTS, id, "")?;
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Submits a draft for admin review.
    ///
    /// # Errors
    ///
    /// Returns the request error.
    pub async fn submit_investment(&self, id: &str) -> ApiResult<Investment> {
        let path = resource_path(INVESTMENTS, id, SUBMIT_SUFFIX)?;
        let payload = self.execute(ApiRequest::post(path)).await?;
        self.investment_or_reload(INVESTMENTS, id, payload).await
    }

    /// Normalizes a state-changing response, fetching the investment from
    /// `collection` when the backend answered without a body.
    pub(super) async fn investment_or_reload(
        &self,
        collection: &str,
        id: &str,
        payload: ApiPayload,
    ) -> ApiResult<Investment> {
        match payload.into_json() {
            serde_json::Value::Null => {
                let path = resource_path(collection, id, "")?;
                normalize(Investment::from_wire(self.fetch(ApiRequest::get(path)).await?))
            }
            value => normalize(Investment::from_wire(value)),
        }
    }
}
