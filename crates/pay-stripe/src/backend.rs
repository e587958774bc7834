//! # Backend Client
//!
//! HTTP client for the checkout backend: `GET /config` for the publishable
//! key and `POST /create-payment-intent` for a fresh client secret.
//! One call per request, no retries.

use crate::api::http_client;
use crate::config::BackendConfig;
use async_trait::async_trait;
use pay_core::{
    ClientConfig, IntentIssuer, IntentRequest, IntentResponse, PaymentError, PaymentResult,
};
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Issues payment intents through the checkout backend
pub struct BackendClient {
    config: BackendConfig,
    client: Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> PaymentResult<Self> {
        let client = http_client(config.timeout).map_err(|e| {
            PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(BackendConfig::from_env()?)
    }
}

#[async_trait(?Send)]
impl IntentIssuer for BackendClient {
    #[instrument(skip(self))]
    async fn fetch_config(&self) -> PaymentResult<ClientConfig> {
        let response = self
            .client
            .get(self.config.config_url())
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(PaymentError::Backend {
                status: status.as_u16(),
                message: body,
            });
        }

        let config: ClientConfig = serde_json::from_str(&body)?;
        debug!(
            "Fetched client config (publishable key present: {})",
            config.publishable_key().is_some()
        );
        Ok(config)
    }

    #[instrument(skip(self, request), fields(currency = %request.currency))]
    async fn create_intent(&self, request: &IntentRequest) -> PaymentResult<IntentResponse> {
        let response = self
            .client
            .post(self.config.intent_url())
            .json(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        // The backend reports its own failures as `{ error: { message } }`,
        // usually with a 4xx status. Those are answers, not transport errors.
        match serde_json::from_str::<IntentResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.error.is_some() => {
                if parsed.error.is_some() {
                    warn!("Backend rejected intent: HTTP {}", status);
                }
                Ok(parsed)
            }
            _ if status.is_success() => Err(PaymentError::Serialization(format!(
                "Unexpected intent response: {}",
                body
            ))),
            _ => Err(PaymentError::Backend {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}
