//! # PaymentIntents
//!
//! Server-side creation of PaymentIntents with the secret key. This is what
//! the backend's `POST /create-payment-intent` calls; the resulting client
//! secret is the only thing handed to the page.

use crate::api::{error_from_response, http_client};
use crate::config::StripeConfig;
use pay_core::{Currency, PaymentError, PaymentResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, info, instrument};

/// A freshly created PaymentIntent
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIntent {
    pub id: String,
    pub client_secret: String,
    pub status: String,
}

/// Client for the PaymentIntents API
pub struct PaymentIntents {
    config: StripeConfig,
    client: Client,
}

impl PaymentIntents {
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = http_client(Duration::from_secs(30)).map_err(|e| {
            PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Create a PaymentIntent for `amount` minor units.
    ///
    /// Each call uses a fresh idempotency key: every request is a new charge.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        amount: i64,
        currency: Currency,
        payment_method_type: &str,
    ) -> PaymentResult<CreatedIntent> {
        if amount <= 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "Amount must be positive, got {}",
                amount
            )));
        }

        let form_params = [
            ("amount", amount.to_string()),
            ("currency", currency.as_str().to_string()),
            ("payment_method_types[]", payment_method_type.to_string()),
        ];
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}", status);
            return Err(error_from_response(status, &headers, &body));
        }

        let intent: CreatedIntent = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created PaymentIntent: id={}, status={}", intent.id, intent.status);
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn intents(server: &MockServer) -> PaymentIntents {
        PaymentIntents::new(
            StripeConfig::new("sk_test_abc", "pk_test_abc").with_api_base_url(server.uri()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_intent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("authorization", "Bearer sk_test_abc"))
            .and(header_exists("idempotency-key"))
            .and(body_string_contains("amount=1999"))
            .and(body_string_contains("currency=usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_1",
                "client_secret": "pi_1_secret_x",
                "status": "requires_payment_method"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let intent = intents(&server).create(1999, Currency::USD, "card").await.unwrap();
        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.client_secret, "pi_1_secret_x");
    }

    #[tokio::test]
    async fn test_create_intent_stripe_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "type": "invalid_request_error", "message": "Invalid currency: xyz" }
            })))
            .mount(&server)
            .await;

        let err = intents(&server)
            .create(1999, Currency::USD, "card")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::ProviderError { ref message, .. } if message == "Invalid currency: xyz"
        ));
    }

    #[tokio::test]
    async fn test_create_intent_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let err = intents(&server)
            .create(1999, Currency::USD, "card")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rate limited by stripe, retry after 3 seconds");
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let server = MockServer::start().await;
        let err = intents(&server).create(0, Currency::USD, "card").await.unwrap_err();
        assert!(matches!(err, PaymentError::InvalidRequest(_)));
    }
}
