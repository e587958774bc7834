//! # Status Messages
//!
//! Every human-readable string the status region can show, and the single
//! place where a missing or empty message falls back to its default.

use crate::error::PaymentError;
use crate::intent::IntentStatus;

/// Published when the backend returns no publishable key
pub const MISSING_PUBLISHABLE_KEY: &str =
    "No publishable key returned from the server. Please check `.env` and try again";

/// Interrupting notice raised alongside [`MISSING_PUBLISHABLE_KEY`]
pub const CONFIGURE_KEY_NOTICE: &str =
    "Please set your Stripe publishable API key in the .env file";

/// Published when the device cannot present the wallet button
pub const WALLET_UNSUPPORTED: &str = "Apple Pay support not found. Check the pre-requisites above and ensure you are testing in a supported browser.";

/// Default for an issuance response without a secret or message
pub const MISSING_CLIENT_SECRET: &str = "No client secret returned from the server";

/// Default for a processor error without a message
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Placeholder for a missing status or identifier in the final line
pub const UNKNOWN_FIELD: &str = "unknown";

/// Use `message` unless it is absent or blank, else `default`
pub fn resolve(message: Option<&str>, default: &str) -> String {
    match message.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => default.to_string(),
    }
}

/// Final line for a settled confirmation, e.g. `Payment succeeded: pi_123`
pub fn payment_status(status: Option<&IntentStatus>, id: Option<&str>) -> String {
    format!(
        "Payment {}: {}",
        status.map(IntentStatus::as_str).unwrap_or(UNKNOWN_FIELD),
        id.unwrap_or(UNKNOWN_FIELD)
    )
}

/// Generic status for an unexpected failure during page setup
pub fn initialization_failed(err: &PaymentError) -> String {
    format!("Error initializing Stripe: {}", err)
}

/// Generic status for an unexpected failure before confirmation started
pub fn issuance_failed(err: &PaymentError) -> String {
    format!("Error creating payment intent: {}", err)
}

/// Generic status for an unexpected failure while confirming
pub fn confirmation_failed(err: &PaymentError) -> String {
    format!("Error confirming payment: {}", err)
}
