//! # Stripe API Types
//!
//! Wire types shared by the confirmation gateway and the server-side
//! PaymentIntents client.

use pay_core::{PaymentError, PaymentIntent, ProcessorError};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Build an HTTP client. Browser fetch has no client-level timeout, so the
/// timeout only applies natively.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    let builder = Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(timeout);
    #[cfg(target_arch = "wasm32")]
    let _ = timeout;
    builder.build()
}

#[derive(Debug, Deserialize)]
pub(crate) struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StripeError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub decline_code: Option<String>,
    /// Present on confirmation errors that still produced an intent
    #[serde(default)]
    pub payment_intent: Option<PaymentIntent>,
}

impl StripeError {
    pub fn is_card_error(&self) -> bool {
        self.error_type.as_deref() == Some("card_error")
    }

    pub fn into_processor_error(self) -> ProcessorError {
        ProcessorError {
            message: self.message,
            code: self.decline_code.or(self.code),
        }
    }
}

/// `Retry-After` in seconds; the HTTP-date form is ignored
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Map an unsuccessful Stripe response to a `PaymentError`
pub(crate) fn error_from_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> PaymentError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return PaymentError::RateLimited {
            provider: "stripe".to_string(),
            retry_after_secs: retry_after_secs(headers),
        };
    }

    match serde_json::from_str::<StripeErrorResponse>(body) {
        Ok(response) if response.error.is_card_error() => PaymentError::PaymentDeclined {
            reason: response
                .error
                .message
                .unwrap_or_else(|| "card declined".to_string()),
        },
        Ok(response) => PaymentError::ProviderError {
            provider: "stripe".to_string(),
            message: response
                .error
                .message
                .unwrap_or_else(|| format!("HTTP {}", status)),
        },
        Err(_) => PaymentError::ProviderError {
            provider: "stripe".to_string(),
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_error_maps_to_declined() {
        let body = r#"{"error":{"type":"card_error","message":"Your card was declined.","code":"card_declined"}}"#;
        let err = error_from_response(StatusCode::PAYMENT_REQUIRED, &HeaderMap::new(), body);
        assert!(matches!(
            err,
            PaymentError::PaymentDeclined { reason } if reason == "Your card was declined."
        ));
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "7".parse().unwrap());
        let err = error_from_response(StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert!(matches!(
            err,
            PaymentError::RateLimited {
                retry_after_secs: Some(7),
                ..
            }
        ));
    }

    #[test]
    fn test_rate_limit_without_retry_after() {
        let err = error_from_response(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), "");
        assert!(matches!(
            err,
            PaymentError::RateLimited {
                retry_after_secs: None,
                ..
            }
        ));
        assert_eq!(err.status_code(), 429);
    }

    #[test]
    fn test_unparseable_body() {
        let err =
            error_from_response(StatusCode::BAD_GATEWAY, &HeaderMap::new(), "upstream down");
        assert_eq!(
            err.to_string(),
            "Provider error [stripe]: HTTP 502 Bad Gateway: upstream down"
        );
    }

    #[test]
    fn test_processor_error_prefers_decline_code() {
        let error: StripeError = serde_json::from_str(
            r#"{"message":"Insufficient funds","code":"card_declined","decline_code":"insufficient_funds"}"#,
        )
        .unwrap();
        let processor = error.into_processor_error();
        assert_eq!(processor.code.as_deref(), Some("insufficient_funds"));
        assert_eq!(processor.message.as_deref(), Some("Insufficient funds"));
    }
}
