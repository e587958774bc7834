//! # Configuration
//!
//! Client- and server-side settings for the Stripe integration.
//! Everything is loaded from environment variables (a `.env` file is honored).

use pay_core::PaymentError;
use std::env;
use std::time::Duration;

/// Stripe API version the integration is written against
pub const STRIPE_API_VERSION: &str = "2020-08-27";

/// Production Stripe API base URL
pub const STRIPE_API_BASE_URL: &str = "https://api.stripe.com";

/// Backend used when `PAYMENT_BACKEND_URL` is not set
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4242";

/// Where the checkout page finds its backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (no trailing slash)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Load from `PAYMENT_BACKEND_URL`, falling back to localhost.
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let base_url =
            env::var("PAYMENT_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PaymentError::Configuration(format!(
                "PAYMENT_BACKEND_URL must be an http(s) URL, got {}",
                base_url
            )));
        }

        Ok(Self::new(base_url))
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn config_url(&self) -> String {
        format!("{}/config", self.base_url)
    }

    pub fn intent_url(&self) -> String {
        format!("{}/create-payment-intent", self.base_url)
    }
}

/// Server-side Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key handed to the page (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    ///
    /// Optional: `STRIPE_API_BASE_URL`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| {
            PaymentError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        let publishable_key = env::var("STRIPE_PUBLISHABLE_KEY").map_err(|_| {
            PaymentError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string())
        })?;

        let config = Self::new(secret_key, publishable_key);
        config.validate()?;

        match env::var("STRIPE_API_BASE_URL") {
            Ok(url) => Ok(config.with_api_base_url(url)),
            Err(_) => Ok(config),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            api_base_url: STRIPE_API_BASE_URL.to_string(),
            api_version: STRIPE_API_VERSION.to_string(),
        }
    }

    /// Check key prefixes
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.secret_key.starts_with("sk_test_") && !self.secret_key.starts_with("sk_live_") {
            return Err(PaymentError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if !is_publishable_key(&self.publishable_key) {
            return Err(PaymentError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        if self.is_test_mode() != self.publishable_key.starts_with("pk_test_") {
            return Err(PaymentError::Configuration(
                "Secret and publishable keys belong to different modes".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

/// True for `pk_test_...` / `pk_live_...`
pub fn is_publishable_key(key: &str) -> bool {
    key.starts_with("pk_test_") || key.starts_with("pk_live_")
}
