//! # Payment Error Types
//!
//! Typed error handling for the wallet-pay authorization flow.
//! Every collaborator call returns `Result<T, PaymentError>`.

use thiserror::Error;

/// Everything that can go wrong between page load and a terminal attempt
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The backend answered `/config` without a usable publishable key
    #[error("No publishable key returned from the server")]
    MissingPublishableKey,

    /// Malformed env or checkout config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A transaction or intent request that cannot be sent as-is
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment processor failed to initialize
    #[error("Processor initialization failed: {0}")]
    ProcessorInit(String),

    /// The device/browser capability check could not be evaluated
    #[error("Capability check failed: {0}")]
    CapabilityCheck(String),

    /// The affordance element could not be mounted or hidden
    #[error("Affordance error: {0}")]
    Affordance(String),

    /// Stripe answered with an error the flow cannot show as-is
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Backend (intent issuance) reported an HTTP failure
    #[error("Backend error: HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    /// Transport failure talking to Stripe or the backend
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The event channel closed before an event could be delivered
    #[error("Event channel closed")]
    ChannelClosed,

    /// Card or wallet declined by the issuer
    #[error("Payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// HTTP 429 from Stripe; `Retry-After` when the response carried one
    #[error(
        "Rate limited by {provider}{}",
        .retry_after_secs.map(|secs| format!(", retry after {} seconds", secs)).unwrap_or_default()
    )]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// Broken invariant inside the flow
    #[error("Internal error: {0}")]
    Internal(String),

    /// Undecodable backend or processor payload
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::MissingPublishableKey => 500,
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::ProcessorInit(_) => 500,
            PaymentError::CapabilityCheck(_) => 500,
            PaymentError::Affordance(_) => 500,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::Backend { status, .. } => *status,
            PaymentError::NetworkError(_) => 503,
            PaymentError::ChannelClosed => 500,
            PaymentError::PaymentDeclined { .. } => 402,
            PaymentError::RateLimited { .. } => 429,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result of any step of the authorization flow
pub type PaymentResult<T> = Result<T, PaymentError>;
