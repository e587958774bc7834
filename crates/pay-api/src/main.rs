//! # wallet-pay
//!
//! Checkout backend for the wallet-button storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export LOG_FORMAT=json   # optional
//!
//! # Run the server
//! wallet-pay
//! ```

use pay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging; LOG_FORMAT=json for log shippers
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    tracing_subscriber::registry()
        .with((!json_logs).then(fmt::layer))
        .with(json_logs.then(|| fmt::layer().json()))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;

    info!("Environment: {}", state.config.environment);
    info!(
        "Charging {} for {:?}",
        state.transaction.display_total(),
        state.transaction.label()
    );

    let app = routes::create_router(state.clone());

    info!("wallet-pay {} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);
    if !state.config.is_production() {
        info!("Config: GET http://{}/config", addr);
        info!("Intent: POST http://{}/create-payment-intent", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
