//! # pay-api
//!
//! Checkout backend for wallet-pay-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The two endpoints the checkout page depends on
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/config` | `{ publishableKey }` |
//! | POST | `/create-payment-intent` | `{ clientSecret }` or `{ error: { message } }` |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
