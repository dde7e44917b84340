//! Funding sources and Plaid bank linking.

use harbor_domain::{
    ApiPayload, ApiRequest, LinkBankAccount, LinkToken, PaymentMethod, resource_path,
};

use super::{HarborClient, LIST_PAYMENT_METHODS, normalize};
use crate::client::endpoints::{PAYMENT_METHODS, PLAID_LINK, PLAID_LINK_TOKEN};
use crate::error::ApiResult;

impl HarborClient {
    /// Lists linked payment methods. Concurrent callers share one request.
    ///
    /// # Errors
    ///
    /// Returns the request error, shared by every concurrent caller.
    pub async fn list_payment_methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        let client = self.clone();
        self.payment_methods
            .coalesce(LIST_PAYMENT_METHODS, move || async move {
                let payload = client.fetch(ApiRequest::get(PAYMENT_METHODS)).await?;
                normalize(PaymentMethod::list_from_wire(payload))
            })
            .await
    }

    /// Requests a Plaid Link token to open the bank-linking flow.
    ///
    /// # Errors
    ///
    /// Returns the request error or a malformed-response error.
    pub async fn create_link_token(&self) -> ApiResult<LinkToken> {
        let payload = self.fetch(ApiRequest::post(PLAID_LINK_TOKEN)).await?;
        normalize(LinkToken::from_wire(payload))
    }

    /// Exchanges the Plaid public token for a linked account.
    ///
    /// Returns the new payment method when the backend sends it back.
    ///
    /// # Errors
    ///
    /// Returns the request error or a malformed-response error.
    pub async fn link_bank_account(
        &self,
        public_token: &str,
        account_id: &str,
    ) -> ApiResult<Option<PaymentMethod>> {
        let body = LinkBankAccount {
            public_token: public_token.to_string(),
            account_id: account_id.to_string(),
        };
        let request = ApiRequest::post(PLAID_LINK).with_json(&body)?;
        match self.execute(request).await? {
            ApiPayload::NoContent => Ok(None),
            ApiPayload::Json(value) if value.is_null() => Ok(None),
            ApiPayload::Json(value) => normalize(PaymentMethod::from_wire(value)).map(Some),
        }
    }

    /// Removes a payment method.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::InvalidRequest`] for an unusable id, or the
    /// request error.
    pub async fn delete_payment_method(&self, id: &str) -> ApiResult<()> {
        let path = resource_path(PAYMENT_METHODS, id, "")?;
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ApiResultExt};
    use crate::operations::tests::{client, signed_in};
    use crate::test_support::{MemoryStore, json, no_content};
    use harbor_domain::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_concurrent_listing_shares_one_request() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, |_| {
            json(
                200,
                &json!({"payment_methods": [
                    {"id": 1, "type": "bank_account", "bank_name": "Chase", "mask": "1234"}
                ]}),
            )
        });
        signed_in(&client).await;

        let (a, b) = tokio::join!(client.list_payment_methods(), client.list_payment_methods());

        assert_eq!(transport.count(PAYMENT_METHODS), 1);
        let methods = a.unwrap();
        assert_eq!(methods, b.unwrap());
        assert_eq!(methods[0].label(), "Chase ••1234");

        client.list_payment_methods().await.unwrap();
        assert_eq!(transport.count(PAYMENT_METHODS), 2);
    }

    #[tokio::test]
    async fn test_link_flow() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, |request| match request.url.as_str() {
            PLAID_LINK_TOKEN => json(200, &json!({"link_token": "link-sandbox-1"})),
            PLAID_LINK => json(201, &json!({"payment_method": {"id": "pm_9", "type": "ach"}})),
            _ => json(404, &json!({})),
        });
        signed_in(&client).await;

        let token = client.create_link_token().await.unwrap();
        assert_eq!(token.link_token, "link-sandbox-1");

        let method = client
            .link_bank_account("public-sandbox-xyz", "acc_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(method.id, "pm_9");

        let sent = &transport.requests()[1];
        assert_eq!(
            sent.body.as_deref(),
            Some(br#"{"public_token":"public-sandbox-xyz","account_id":"acc_1"}"#.as_slice())
        );
    }

    #[tokio::test]
    async fn test_link_without_body() {
        let storage = MemoryStore::new();
        let (client, _) = client(&storage, |_| no_content());
        assert_eq!(client.link_bank_account("p", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_payment_method() {
        let storage = MemoryStore::new();
        let (client, transport) = client(&storage, |_| no_content());
        signed_in(&client).await;

        let envelope = client.delete_payment_method("pm_9").await.into_envelope();
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true})
        );
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.url, "/api/payment-methods/pm_9");

        let error = client.delete_payment_method("../users").await.unwrap_err();
        assert!(matches!(error, ApiError::InvalidRequest(_)));
        assert_eq!(transport.requests().len(), 1);
    }
}
