//! # pay-stripe
//!
//! Stripe and backend HTTP clients for wallet-pay-rs.
//!
//! This crate provides:
//!
//! 1. **BackendClient** - `IntentIssuer` over the checkout backend
//!    - `GET /config` for the publishable key
//!    - `POST /create-payment-intent` for a fresh client secret
//!
//! 2. **StripeGateway** / **StripeConnector** - `PaymentGateway` over the
//!    Stripe REST API, authorised with the publishable key
//!
//! 3. **PaymentIntents** - server-side intent creation with the secret key
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_core::{CheckoutBootstrap, MemoryStatus, TransactionRequest, WalletMethod};
//! use pay_stripe::{BackendClient, StripeConnector};
//! use std::rc::Rc;
//!
//! let issuer = Rc::new(BackendClient::from_env()?);
//! let connector = StripeConnector::new([WalletMethod::ApplePay]);
//!
//! let session = CheckoutBootstrap::new(issuer, connector, Rc::new(MemoryStatus::new()), TransactionRequest::default())
//!     .initialize()
//!     .await?;
//! session.run().await;
//! ```

mod api;
pub mod backend;
pub mod config;
pub mod gateway;
pub mod intents;

// Re-exports
pub use backend::BackendClient;
pub use config::{BackendConfig, StripeConfig, STRIPE_API_VERSION};
pub use gateway::{StripeConnector, StripeGateway};
pub use intents::{CreatedIntent, PaymentIntents};
