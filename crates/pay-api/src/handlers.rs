//! # Request Handlers
//!
//! Axum request handlers for the checkout backend.
//! Failures on the intent endpoint are reported in the body as
//! `{ "error": { "message": ... } }` so the page can show them verbatim.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use pay_core::{ClientConfig, IntentRequest, IntentResponse, PaymentError};
use tracing::{error, info, instrument, warn};

/// Message shown to the customer for a failed intent request
fn customer_message(err: &PaymentError) -> String {
    match err {
        PaymentError::ProviderError { message, .. } => message.clone(),
        PaymentError::PaymentDeclined { reason } => reason.clone(),
        PaymentError::InvalidRequest(message) => message.clone(),
        other => other.to_string(),
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<IntentResponse>) {
    let status = match &err {
        PaymentError::ProviderError { .. }
        | PaymentError::PaymentDeclined { .. }
        | PaymentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        other => StatusCode::from_u16(other.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    (status, Json(IntentResponse::error(customer_message(&err))))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "wallet-pay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /config`: the publishable key for the page
pub async fn get_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        publishable_key: Some(state.publishable_key().to_string()),
    })
}

/// `POST /create-payment-intent`: a fresh client secret per call
#[instrument(
    skip(state, request),
    fields(currency = %request.currency, method = %request.payment_method_type)
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<IntentRequest>,
) -> Result<Json<IntentResponse>, (StatusCode, Json<IntentResponse>)> {
    let transaction = &state.transaction;

    if request.currency != transaction.currency() {
        warn!(
            "Rejected intent in {}; this storefront charges {}",
            request.currency,
            transaction.currency()
        );
        return Err(payment_error_to_response(PaymentError::InvalidRequest(
            format!("Unsupported currency: {}", request.currency.as_str()),
        )));
    }

    let intent = state
        .intents
        .create(
            transaction.amount(),
            transaction.currency(),
            &request.payment_method_type,
        )
        .await
        .map_err(|e| {
            error!("Failed to create payment intent: {}", e);
            payment_error_to_response(e)
        })?;

    info!("Issued client secret for {}", intent.id);
    Ok(Json(IntentResponse::secret(intent.client_secret)))
}
