//! # Intent and Confirmation Types
//!
//! Wire shapes exchanged with the backend and the processor, plus the
//! secret newtype that ties one event to one pending charge.

use crate::event::PaymentMethodId;
use crate::messages;
use crate::request::Currency;
use serde::{Deserialize, Serialize};

/// Payment-method type hint sent with every intent request
pub const CARD_METHOD_TYPE: &str = "card";

/// Response of `GET /config`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub publishable_key: Option<String>,
}

impl ClientConfig {
    /// The key, if present and non-empty
    pub fn publishable_key(&self) -> Option<&str> {
        self.publishable_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Body of `POST /create-payment-intent`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub currency: Currency,
    pub payment_method_type: String,
}

impl IntentRequest {
    pub fn card(currency: Currency) -> Self {
        Self {
            currency,
            payment_method_type: CARD_METHOD_TYPE.to_string(),
        }
    }
}

/// Error object the backend may embed in its response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `POST /create-payment-intent`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BackendError>,
}

impl IntentResponse {
    pub fn secret(secret: impl Into<String>) -> Self {
        Self {
            client_secret: Some(secret.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            client_secret: None,
            error: Some(BackendError {
                message: Some(message.into()),
            }),
        }
    }

    /// Extract the secret, or the status message explaining why there is none.
    ///
    /// An error object wins over a secret; an empty secret counts as missing.
    pub fn into_secret(self) -> Result<IntentSecret, String> {
        if let Some(error) = self.error {
            return Err(messages::resolve(
                error.message.as_deref(),
                messages::MISSING_CLIENT_SECRET,
            ));
        }
        match self.client_secret {
            Some(secret) if !secret.is_empty() => Ok(IntentSecret(secret)),
            _ => Err(messages::MISSING_CLIENT_SECRET.to_string()),
        }
    }
}

/// Server-issued secret for one pending charge.
///
/// Deliberately not `Clone`: a secret belongs to exactly one attempt.
#[derive(PartialEq, Eq)]
pub struct IntentSecret(String);

impl IntentSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for the confirmation call only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The PaymentIntent id (`pi_...`) the secret belongs to
    pub fn intent_id(&self) -> &str {
        self.0
            .split_once("_secret_")
            .map(|(id, _)| id)
            .unwrap_or(&self.0)
    }
}

impl std::fmt::Debug for IntentSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IntentSecret({}_secret_***)", self.intent_id())
    }
}

/// Arguments of one confirmation call
#[derive(Debug, Clone, Copy)]
pub struct ConfirmRequest<'a> {
    pub secret: &'a IntentSecret,
    /// `None` on the post-challenge reconfirmation
    pub payment_method: Option<&'a PaymentMethodId>,
    /// Whether the processor may run its own challenge UI
    pub handle_actions: bool,
}

impl<'a> ConfirmRequest<'a> {
    /// First confirmation: explicit method, challenges left to the caller
    pub fn initial(secret: &'a IntentSecret, payment_method: &'a PaymentMethodId) -> Self {
        Self {
            secret,
            payment_method: Some(payment_method),
            handle_actions: false,
        }
    }

    /// Challenge resolution: same secret, no method, default handling
    pub fn challenge(secret: &'a IntentSecret) -> Self {
        Self {
            secret,
            payment_method: None,
            handle_actions: true,
        }
    }
}

/// PaymentIntent status as reported by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentStatus {
    RequiresAction,
    Succeeded,
    Failed,
    Other(String),
}

impl IntentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Failed => "failed",
            IntentStatus::Other(s) => s,
        }
    }
}

impl From<String> for IntentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "requires_action" => IntentStatus::RequiresAction,
            "succeeded" => IntentStatus::Succeeded,
            "failed" => IntentStatus::Failed,
            _ => IntentStatus::Other(s),
        }
    }
}

impl From<IntentStatus> for String {
    fn from(status: IntentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The PaymentIntent fields the flow reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: IntentStatus,
}

/// Error reported by the processor for a confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Result of one confirmation call: `{ error?, paymentIntent? }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResult {
    #[serde(default)]
    pub payment_intent: Option<PaymentIntent>,
    #[serde(default)]
    pub error: Option<ProcessorError>,
}

impl ConfirmationResult {
    pub fn intent(id: impl Into<String>, status: IntentStatus) -> Self {
        Self {
            payment_intent: Some(PaymentIntent {
                id: id.into(),
                status,
            }),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            payment_intent: None,
            error: Some(ProcessorError {
                message: Some(message.into()),
                code: None,
            }),
        }
    }

    /// Status message for a processor-reported error, if one is present
    pub fn rejection(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| messages::resolve(e.message.as_deref(), messages::UNKNOWN_ERROR))
    }

    pub fn status(&self) -> Option<&IntentStatus> {
        self.payment_intent.as_ref().map(|pi| &pi.status)
    }

    pub fn intent_id(&self) -> Option<&str> {
        self.payment_intent.as_ref().map(|pi| pi.id.as_str())
    }

    pub fn requires_action(&self) -> bool {
        self.error.is_none() && self.status() == Some(&IntentStatus::RequiresAction)
    }

    /// `Payment <status>: <id>`
    pub fn status_line(&self) -> String {
        messages::payment_status(self.status(), self.intent_id())
    }
}
