use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use crate::core::{ServiceError, ServiceResult};

pub const STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";

/// Minimal Stripe REST client. Requests are form-encoded with the secret key
/// as bearer auth; only the response fields this service reads are modeled.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub items: SubscriptionItemList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItemList {
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,
}

impl Subscription {
    /// Price id of the first subscription item: the plan the profile stores.
    pub fn plan_price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        StripeClient {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: STRIPE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> ServiceResult<T> {
        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("stripe", e))?;

        Self::decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let resp = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| ServiceError::upstream("stripe", e))?;

        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ServiceResult<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Upstream {
                service: "stripe",
                message: format!("HTTP {}: {}", status, text),
            });
        }
        resp.json()
            .await
            .map_err(|e| ServiceError::upstream("stripe", e))
    }

    pub async fn create_customer(
        &self,
        email: Option<&str>,
        user_id: &str,
    ) -> ServiceResult<Customer> {
        let mut params = vec![("metadata[userId]", user_id)];
        if let Some(email) = email {
            params.push(("email", email));
        }
        self.post_form("customers", &params).await
    }

    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        user_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> ServiceResult<CheckoutSession> {
        let params = [
            ("mode", "subscription"),
            ("customer", customer_id),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("metadata[userId]", user_id),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];
        self.post_form("checkout/sessions", &params).await
    }

    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> ServiceResult<PortalSession> {
        let params = [("customer", customer_id), ("return_url", return_url)];
        self.post_form("billing_portal/sessions", &params).await
    }

    pub async fn retrieve_subscription(&self, subscription_id: &str) -> ServiceResult<Subscription> {
        self.get(&format!("subscriptions/{}", subscription_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_exposes_first_item_price() {
        let subscription: Subscription = serde_json::from_str(
            r#"{
                "id": "sub_123",
                "status": "active",
                "metadata": {"userId": "user-1"},
                "items": {"data": [{"price": {"id": "price_pro_monthly"}}]}
            }"#,
        )
        .expect("subscription json");

        assert_eq!(subscription.plan_price_id(), Some("price_pro_monthly"));
        assert_eq!(subscription.metadata.get("userId").map(String::as_str), Some("user-1"));
    }

    #[test]
    fn subscription_without_items_has_no_plan() {
        let subscription: Subscription = serde_json::from_str(
            r#"{"id": "sub_123", "status": "canceled", "items": {"data": []}}"#,
        )
        .expect("subscription json");
        assert_eq!(subscription.plan_price_id(), None);
    }
}
