//! # pay-wasm
//!
//! Browser entry point for wallet-pay-rs.
//!
//! Brings up the payment request button on a checkout page:
//! - fetches the publishable key from the backend
//! - builds a Stripe.js payment request for the transaction
//! - mounts the button into `#payment-request-button`, or hides the
//!   container when no wallet is available
//! - runs every approved payment method through its own authorization
//!   attempt, reporting progress in `#messages`
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { start } from './pkg/pay_wasm.js';
//!
//! await init();
//! await start('http://localhost:4242');
//! ```
//!
//! Stripe.js (`https://js.stripe.com/v3/`) must already be loaded.
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/pay-wasm --target web
//! ```

mod bindings;
pub mod dom;
pub mod gateway;

pub use dom::{DomAffordance, DomStatus};
pub use gateway::{StripeJsConnector, StripeJsGateway};

use dom::{html_element, ButtonSlot, BUTTON_CONTAINER_ID};
use pay_core::{CheckoutBootstrap, PaymentError, SharedStatus, TransactionRequest};
use pay_stripe::{BackendClient, BackendConfig};
use std::rc::Rc;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

fn to_js_error(err: PaymentError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Module init: panics and `tracing` events go to the browser console.
/// Safe to call more than once.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if tracing_wasm::try_set_as_global_default().is_err() {
        info!("tracing subscriber already installed");
    }
}

/// Start the checkout page for the demo transaction
#[wasm_bindgen]
pub async fn start(backend_url: String) -> Result<(), JsValue> {
    run(backend_url, TransactionRequest::default()).await
}

/// Start the checkout page for a transaction in the `checkout.toml` format
#[wasm_bindgen(js_name = startWithTransaction)]
pub async fn start_with_transaction(
    backend_url: String,
    checkout_toml: String,
) -> Result<(), JsValue> {
    let request = TransactionRequest::from_toml(&checkout_toml).map_err(to_js_error)?;
    run(backend_url, request).await
}

async fn run(backend_url: String, request: TransactionRequest) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    let status: SharedStatus = Rc::new(DomStatus::from_document(&document));
    let button: ButtonSlot = Rc::default();
    let issuer = BackendClient::new(BackendConfig::new(backend_url)).map_err(to_js_error)?;

    let mut bootstrap = CheckoutBootstrap::new(
        Rc::new(issuer),
        StripeJsConnector::new(button.clone()),
        status,
        request,
    );
    if let Some(container) = html_element(&document, BUTTON_CONTAINER_ID) {
        bootstrap = bootstrap.with_affordance(Rc::new(DomAffordance::new(container, button)));
    }

    let session = bootstrap.initialize().await.map_err(|err| {
        error!("Checkout page failed to start: {}", err);
        to_js_error(err)
    })?;
    info!("Checkout ready: {:?}", session.decision());

    // Each approved method gets its own attempt; attempts never share state.
    let (orchestrator, mut events) = session.into_parts();
    spawn_local(async move {
        while let Some(event) = events.recv().await {
            let orchestrator = orchestrator.clone();
            spawn_local(async move {
                orchestrator.authorize(event).await;
            });
        }
    });
    Ok(())
}
