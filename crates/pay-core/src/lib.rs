//! # pay-core
//!
//! Core types and the authorization state machine for wallet-pay.
//!
//! This crate provides:
//! - `TransactionRequest` describing what the wallet sheet charges
//! - `PaymentMethodEvent` and its single-use `Completion`
//! - Collaborator traits: `IntentIssuer`, `PaymentGateway`,
//!   `GatewayConnector`, `StatusSink`, `Affordance`
//! - `CapabilityGate` deciding whether the wallet button is shown
//! - `AuthorizationOrchestrator` driving one event to a terminal state
//! - `CheckoutBootstrap` / `CheckoutSession` wiring it all together
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{CheckoutBootstrap, MemoryStatus, TransactionRequest};
//! use std::rc::Rc;
//!
//! let session = CheckoutBootstrap::new(issuer, connector, Rc::new(MemoryStatus::new()), TransactionRequest::default())
//!     .with_affordance(button_container)
//!     .initialize()
//!     .await?;
//!
//! // Authorize wallet events until the page goes away
//! session.run().await;
//! ```

pub mod bootstrap;
pub mod capability;
pub mod error;
pub mod event;
pub mod gateway;
pub mod intent;
pub mod messages;
pub mod orchestrator;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use bootstrap::{CheckoutBootstrap, CheckoutSession};
pub use capability::{CapabilityGate, GateDecision};
pub use error::{PaymentError, PaymentResult};
pub use event::{
    event_channel, Completion, CompletionOutcome, CompletionReceiver, EventReceiver,
    EventSender, PaymentMethodEvent, PaymentMethodId,
};
pub use gateway::{
    Affordance, GatewayConnector, IntentIssuer, MemoryStatus, PaymentGateway, SharedAffordance,
    SharedGateway, SharedIssuer, SharedStatus, StatusSink,
};
pub use intent::{
    BackendError, ClientConfig, ConfirmRequest, ConfirmationResult, IntentRequest,
    IntentResponse, IntentSecret, IntentStatus, PaymentIntent, ProcessorError,
    CARD_METHOD_TYPE,
};
pub use orchestrator::{AttemptReport, AuthorizationOrchestrator, AuthorizationState};
pub use request::{Currency, TransactionRequest, WalletMethod};
