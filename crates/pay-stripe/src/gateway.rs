//! # Stripe Gateway
//!
//! `PaymentGateway` over the Stripe REST API, authorised with the page's
//! publishable key and the intent's client secret (the same calls Stripe.js
//! makes). Used outside the browser: in tests, kiosks and server-driven
//! wallets, where the host reports which wallets the device offers and
//! feeds approved payment methods in through [`StripeGateway::approve`].

use crate::api::{error_from_response, http_client, StripeErrorResponse};
use crate::config::{is_publishable_key, STRIPE_API_BASE_URL, STRIPE_API_VERSION};
use async_trait::async_trait;
use pay_core::{
    CompletionReceiver, ConfirmRequest, ConfirmationResult, EventSender, GatewayConnector,
    PaymentError, PaymentGateway, PaymentIntent, PaymentMethodEvent, PaymentMethodId,
    PaymentResult, SharedGateway, TransactionRequest, WalletMethod,
};
use reqwest::Client;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Stripe confirmation gateway bound to one publishable key
pub struct StripeGateway {
    publishable_key: String,
    api_base_url: String,
    api_version: String,
    client: Client,
    request: TransactionRequest,
    available_wallets: BTreeSet<WalletMethod>,
    events: RefCell<Option<EventSender>>,
}

impl StripeGateway {
    pub fn new(
        publishable_key: impl Into<String>,
        request: TransactionRequest,
    ) -> PaymentResult<Self> {
        let publishable_key = publishable_key.into();
        if !is_publishable_key(&publishable_key) {
            return Err(PaymentError::ProcessorInit(
                "publishable key must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        let client = http_client(Duration::from_secs(30)).map_err(|e| {
            PaymentError::ProcessorInit(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            publishable_key,
            api_base_url: STRIPE_API_BASE_URL.to_string(),
            api_version: STRIPE_API_VERSION.to_string(),
            client,
            request,
            available_wallets: BTreeSet::new(),
            events: RefCell::new(None),
        })
    }

    /// Builder: wallets the host device reports as available
    pub fn with_wallets(mut self, wallets: impl IntoIterator<Item = WalletMethod>) -> Self {
        self.available_wallets = wallets.into_iter().collect();
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Wallets the sheet would offer: available and not disabled
    pub fn offered_wallets(&self) -> impl Iterator<Item = WalletMethod> + '_ {
        self.available_wallets
            .iter()
            .copied()
            .filter(|w| !self.request.is_disabled(*w))
    }

    /// Deliver an approved payment method to the subscriber.
    ///
    /// Returns the receiver the sheet's completion arrives on.
    pub fn approve(
        &self,
        payment_method: PaymentMethodId,
        payer_name: Option<String>,
        payer_email: Option<String>,
    ) -> PaymentResult<CompletionReceiver> {
        if self.request.payer_email_required() && payer_email.is_none() {
            return Err(PaymentError::InvalidRequest(
                "payer email is required for this transaction".to_string(),
            ));
        }
        if self.request.payer_name_required() && payer_name.is_none() {
            return Err(PaymentError::InvalidRequest(
                "payer name is required for this transaction".to_string(),
            ));
        }

        let events = self.events.borrow();
        let sender = events.as_ref().ok_or(PaymentError::ChannelClosed)?;
        let (event, completion) = PaymentMethodEvent::new(payment_method);
        sender
            .send(event.with_payer(payer_name, payer_email))
            .map_err(|_| PaymentError::ChannelClosed)?;
        Ok(completion)
    }

    fn confirm_form(request: &ConfirmRequest<'_>) -> Vec<(&'static str, String)> {
        let mut form = vec![("client_secret", request.secret.expose().to_string())];
        if let Some(method) = request.payment_method {
            form.push(("payment_method", method.as_str().to_string()));
        }
        if request.handle_actions {
            form.push(("use_stripe_sdk", "true".to_string()));
        }
        form
    }
}

#[async_trait(?Send)]
impl PaymentGateway for StripeGateway {
    async fn can_make_payment(&self) -> PaymentResult<bool> {
        let offered: Vec<_> = self.offered_wallets().map(|w| w.as_str()).collect();
        debug!("Wallets offered: {:?}", offered);
        Ok(!offered.is_empty())
    }

    #[instrument(
        skip(self, request),
        fields(intent = request.secret.intent_id(), handle_actions = request.handle_actions)
    )]
    async fn confirm(&self, request: ConfirmRequest<'_>) -> PaymentResult<ConfirmationResult> {
        let url = format!(
            "{}/v1/payment_intents/{}/confirm",
            self.api_base_url,
            request.secret.intent_id()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.publishable_key)
            .header("Stripe-Version", &self.api_version)
            .form(&Self::confirm_form(&request))
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if status.is_success() {
            let intent: PaymentIntent = serde_json::from_str(&body).map_err(|e| {
                PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;
            info!("Confirmation returned {} for {}", intent.status, intent.id);
            return Ok(ConfirmationResult {
                payment_intent: Some(intent),
                error: None,
            });
        }

        // 4xx with an error object is Stripe's answer; anything else is a failure to talk.
        if status.is_client_error() {
            if let Ok(parsed) = serde_json::from_str::<StripeErrorResponse>(&body) {
                warn!("Confirmation rejected by Stripe: HTTP {}", status);
                let payment_intent = parsed.error.payment_intent.clone();
                return Ok(ConfirmationResult {
                    payment_intent,
                    error: Some(parsed.error.into_processor_error()),
                });
            }
        }

        Err(error_from_response(status, &headers, &body))
    }

    fn subscribe(&self, events: EventSender) -> PaymentResult<()> {
        *self.events.borrow_mut() = Some(events);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

/// Connects a [`StripeGateway`] once the page knows its publishable key
#[derive(Debug, Clone, Default)]
pub struct StripeConnector {
    api_base_url: Option<String>,
    wallets: Vec<WalletMethod>,
}

impl StripeConnector {
    pub fn new(wallets: impl IntoIterator<Item = WalletMethod>) -> Self {
        Self {
            api_base_url: None,
            wallets: wallets.into_iter().collect(),
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Connect and keep the concrete type (for hosts that call `approve`)
    pub fn connect_stripe(
        &self,
        publishable_key: &str,
        request: &TransactionRequest,
    ) -> PaymentResult<Rc<StripeGateway>> {
        let mut gateway = StripeGateway::new(publishable_key, request.clone())?
            .with_wallets(self.wallets.iter().copied());
        if let Some(url) = &self.api_base_url {
            gateway = gateway.with_api_base_url(url.clone());
        }
        Ok(Rc::new(gateway))
    }
}

#[async_trait(?Send)]
impl GatewayConnector for StripeConnector {
    async fn connect(
        &self,
        publishable_key: &str,
        request: &TransactionRequest,
    ) -> PaymentResult<SharedGateway> {
        Ok(self.connect_stripe(publishable_key, request)? as SharedGateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{event_channel, CompletionOutcome, IntentSecret, IntentStatus};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "pi_123_secret_abc";

    fn gateway(server: &MockServer) -> StripeGateway {
        StripeGateway::new("pk_test_123", TransactionRequest::default())
            .unwrap()
            .with_api_base_url(server.uri())
    }

    #[test]
    fn test_rejects_secret_key() {
        let result = StripeGateway::new("sk_test_123", TransactionRequest::default());
        assert!(matches!(result, Err(PaymentError::ProcessorInit(_))));
    }

    #[tokio::test]
    async fn test_capability_respects_disabled_wallets() {
        let only_google = StripeGateway::new("pk_test_1", TransactionRequest::default())
            .unwrap()
            .with_wallets([WalletMethod::GooglePay]);
        assert!(!only_google.can_make_payment().await.unwrap());

        let apple = StripeGateway::new("pk_test_1", TransactionRequest::default())
            .unwrap()
            .with_wallets([WalletMethod::GooglePay, WalletMethod::ApplePay]);
        assert!(apple.can_make_payment().await.unwrap());
    }

    #[tokio::test]
    async fn test_initial_confirm_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_123/confirm"))
            .and(header("authorization", "Bearer pk_test_123"))
            .and(header("stripe-version", "2020-08-27"))
            .and(body_string_contains("payment_method=pm_card_visa"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "id": "pi_123",
                        "status": "succeeded",
                        "amount": 1999
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let secret = IntentSecret::new(SECRET);
        let method_id = PaymentMethodId::new("pm_card_visa");
        let result = gateway(&server)
            .confirm(ConfirmRequest::initial(&secret, &method_id))
            .await
            .unwrap();

        assert_eq!(result.status(), Some(&IntentStatus::Succeeded));
        assert_eq!(result.intent_id(), Some("pi_123"));
    }

    #[test]
    fn test_challenge_form_has_no_method() {
        let secret = IntentSecret::new(SECRET);
        let form = StripeGateway::confirm_form(&ConfirmRequest::challenge(&secret));
        assert!(form.iter().all(|(k, _)| *k != "payment_method"));
        assert!(form.contains(&("use_stripe_sdk", "true".to_string())));
        assert!(form.contains(&("client_secret", SECRET.to_string())));
    }

    #[tokio::test]
    async fn test_card_error_is_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_123/confirm"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": {
                    "type": "card_error",
                    "code": "card_declined",
                    "message": "Your card was declined.",
                    "payment_intent": { "id": "pi_123", "status": "requires_payment_method" }
                }
            })))
            .mount(&server)
            .await;

        let secret = IntentSecret::new(SECRET);
        let method_id = PaymentMethodId::new("pm_card_chargeDeclined");
        let result = gateway(&server)
            .confirm(ConfirmRequest::initial(&secret, &method_id))
            .await
            .unwrap();

        assert_eq!(result.rejection().as_deref(), Some("Your card was declined."));
        assert_eq!(result.intent_id(), Some("pi_123"));
    }

    #[tokio::test]
    async fn test_server_error_is_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents/pi_123/confirm"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let secret = IntentSecret::new(SECRET);
        let err = gateway(&server)
            .confirm(ConfirmRequest::challenge(&secret))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_approve_delivers_event() {
        let gateway = StripeGateway::new("pk_test_1", TransactionRequest::default()).unwrap();
        let (sender, mut events) = event_channel();
        gateway.subscribe(sender).unwrap();

        let completion = gateway
            .approve(
                PaymentMethodId::new("pm_1"),
                Some("Jane Payer".into()),
                Some("jane@example.com".into()),
            )
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.payment_method.as_str(), "pm_1");
        assert_eq!(event.payer_email.as_deref(), Some("jane@example.com"));
        event.completion.complete(CompletionOutcome::Success);
        assert_eq!(completion.await.unwrap(), CompletionOutcome::Success);
    }

    #[test]
    fn test_approve_requires_payer_details() {
        let gateway = StripeGateway::new("pk_test_1", TransactionRequest::default()).unwrap();
        let (sender, _events) = event_channel();
        gateway.subscribe(sender).unwrap();

        let result = gateway.approve(PaymentMethodId::new("pm_1"), None, None);
        assert!(matches!(result, Err(PaymentError::InvalidRequest(_))));
    }

    #[test]
    fn test_approve_without_subscriber() {
        let gateway = StripeGateway::new("pk_test_1", TransactionRequest::default()).unwrap();
        let result = gateway.approve(
            PaymentMethodId::new("pm_1"),
            Some("A".into()),
            Some("a@example.com".into()),
        );
        assert!(matches!(result, Err(PaymentError::ChannelClosed)));
    }
}
