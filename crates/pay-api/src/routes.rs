//! # Routes
//!
//! Axum router for the checkout backend.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health                - Health check
/// - GET  /config                - Publishable key for the page
/// - POST /create-payment-intent - Fresh PaymentIntent client secret
pub fn create_router(state: AppState) -> Router {
    // The storefront page is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum_test::TestServer;
    use pay_core::TransactionRequest;
    use pay_stripe::{PaymentIntents, StripeConfig};
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(stripe: &MockServer) -> TestServer {
        let intents = PaymentIntents::new(
            StripeConfig::new("sk_test_abc", "pk_test_abc").with_api_base_url(stripe.uri()),
        )
        .unwrap();
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
        };
        let state =
            crate::state::AppState::with_parts(intents, TransactionRequest::default(), config);
        TestServer::new(create_router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let stripe = MockServer::start().await;
        let response = server_for(&stripe).get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_config_returns_publishable_key() {
        let stripe = MockServer::start().await;
        let response = server_for(&stripe).get("/config").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "publishableKey": "pk_test_abc" }));
    }

    #[tokio::test]
    async fn test_create_payment_intent() {
        let stripe = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_1",
                "client_secret": "pi_1_secret_x",
                "status": "requires_payment_method"
            })))
            .expect(1)
            .mount(&stripe)
            .await;

        let response = server_for(&stripe)
            .post("/create-payment-intent")
            .json(&json!({ "currency": "usd", "paymentMethodType": "card" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "clientSecret": "pi_1_secret_x" }));
    }

    #[tokio::test]
    async fn test_stripe_error_is_reported_in_body() {
        let stripe = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": { "type": "card_error", "message": "card_declined" }
            })))
            .mount(&stripe)
            .await;

        let response = server_for(&stripe)
            .post("/create-payment-intent")
            .json(&json!({ "currency": "usd", "paymentMethodType": "card" }))
            .expect_failure()
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": { "message": "card_declined" } }));
    }

    #[tokio::test]
    async fn test_wrong_currency_rejected() {
        let stripe = MockServer::start().await;
        let response = server_for(&stripe)
            .post("/create-payment-intent")
            .json(&json!({ "currency": "eur", "paymentMethodType": "card" }))
            .expect_failure()
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<Value>()["error"]["message"],
            "Unsupported currency: eur"
        );
    }
}
