//! # Application State
//!
//! Shared state for the Axum application: the PaymentIntents client and
//! the one transaction the storefront sells.

use pay_core::TransactionRequest;
use pay_stripe::PaymentIntents;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4242),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e)
            })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Stripe PaymentIntents client
    pub intents: Arc<PaymentIntents>,
    /// What every intent charges
    pub transaction: TransactionRequest,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState from the environment and `config/checkout.toml`
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let intents = PaymentIntents::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let transaction = load_transaction()?;

        Ok(Self::with_parts(intents, transaction, config))
    }

    pub fn with_parts(
        intents: PaymentIntents,
        transaction: TransactionRequest,
        config: AppConfig,
    ) -> Self {
        Self {
            intents: Arc::new(intents),
            transaction,
            config,
        }
    }

    /// Publishable key handed to the page
    pub fn publishable_key(&self) -> &str {
        &self.intents.config().publishable_key
    }
}

/// Load the transaction from config file, or fall back to the demo charge
fn load_transaction() -> anyhow::Result<TransactionRequest> {
    let config_paths = [
        "config/checkout.toml",
        "../config/checkout.toml",
        "../../config/checkout.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let transaction = TransactionRequest::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!(
                "Loaded checkout from {}: {} ({})",
                path,
                transaction.label(),
                transaction.display_total()
            );
            return Ok(transaction);
        }
    }

    tracing::warn!("No checkout config found, using demo transaction");
    Ok(TransactionRequest::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        std::env::remove_var("HOST");
        std::env::remove_var("PORT");

        let config = AppConfig::from_env();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4242);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "test".to_string(),
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_socket_addr() {
        let config = AppConfig {
            host: "not a host".to_string(),
            port: 3000,
            environment: "test".to_string(),
        };
        assert!(config.socket_addr().is_err());
    }
}
