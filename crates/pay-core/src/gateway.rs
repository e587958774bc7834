//! # Collaborator Traits
//!
//! Seams between the authorization core and the outside world. The core
//! never looks anything up by identifier; every collaborator is injected.
//!
//! ```text
//! ┌──────────────────┐   create_intent   ┌────────────────────┐
//! │  IntentIssuer    │ ◄──────────────── │                    │
//! └──────────────────┘                   │   Authorization    │
//! ┌──────────────────┐   confirm         │   Orchestrator     │
//! │  PaymentGateway  │ ◄──────────────── │                    │
//! └──────────────────┘                   └─────────┬──────────┘
//!          ▲ connect                               │ publish
//! ┌────────┴─────────┐                   ┌─────────▼──────────┐
//! │ GatewayConnector │                   │    StatusSink      │
//! └──────────────────┘                   └────────────────────┘
//! ```
//!
//! Traits are `?Send`: the same core runs on a browser event loop, where
//! JS handles are not thread-safe, and on a current-thread tokio runtime.

use crate::error::PaymentResult;
use crate::event::EventSender;
use crate::intent::{
    ClientConfig, ConfirmRequest, ConfirmationResult, IntentRequest, IntentResponse,
};
use crate::request::TransactionRequest;
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;

/// Backend that hands out configuration and payment-intent secrets.
#[async_trait(?Send)]
pub trait IntentIssuer {
    /// `GET /config`
    async fn fetch_config(&self) -> PaymentResult<ClientConfig>;

    /// `POST /create-payment-intent`.
    ///
    /// `Err` means the call itself failed (network, undecodable body); a
    /// backend-reported failure arrives as `Ok` with `error` set.
    async fn create_intent(&self, request: &IntentRequest) -> PaymentResult<IntentResponse>;
}

/// Processor client bound to one publishable key and transaction.
#[async_trait(?Send)]
pub trait PaymentGateway {
    /// Whether this device can present the wallet sheet at all
    async fn can_make_payment(&self) -> PaymentResult<bool>;

    /// Confirm a PaymentIntent.
    ///
    /// `Err` is a transport failure; a processor-reported failure arrives as
    /// `Ok` with `error` set.
    async fn confirm(&self, request: ConfirmRequest<'_>) -> PaymentResult<ConfirmationResult>;

    /// Start delivering payment-method events into `events`
    fn subscribe(&self, events: EventSender) -> PaymentResult<()>;

    /// Get the provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Shared handle to a gateway
pub type SharedGateway = Rc<dyn PaymentGateway>;

/// Shared handle to an issuer
pub type SharedIssuer = Rc<dyn IntentIssuer>;

/// Builds a gateway once the publishable key is known.
#[async_trait(?Send)]
pub trait GatewayConnector {
    async fn connect(
        &self,
        publishable_key: &str,
        request: &TransactionRequest,
    ) -> PaymentResult<SharedGateway>;
}

/// Single-slot status region. Each publish overwrites the previous one.
pub trait StatusSink {
    fn publish(&self, message: &str);

    /// Interrupting notice for fatal setup problems. Default: ignored.
    fn notify(&self, _notice: &str) {}
}

/// Shared handle to the status region
pub type SharedStatus = Rc<dyn StatusSink>;

/// The container the wallet button lives in
pub trait Affordance {
    /// Mount the wallet button into the container
    fn mount(&self) -> PaymentResult<()>;

    /// Hide the container
    fn hide(&self) -> PaymentResult<()>;
}

/// Shared handle to the affordance container
pub type SharedAffordance = Rc<dyn Affordance>;

/// In-memory status region; keeps only the latest message
#[derive(Debug, Default)]
pub struct MemoryStatus {
    current: RefCell<Option<String>>,
    notices: RefCell<Vec<String>>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message currently shown
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Interrupting notices raised so far
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }
}

impl StatusSink for MemoryStatus {
    fn publish(&self, message: &str) {
        *self.current.borrow_mut() = Some(message.to_string());
    }

    fn notify(&self, notice: &str) {
        self.notices.borrow_mut().push(notice.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_status_last_write_wins() {
        let status = MemoryStatus::new();
        assert_eq!(status.current(), None);

        status.publish("first");
        status.publish("second");
        assert_eq!(status.current().as_deref(), Some("second"));
    }

    #[test]
    fn test_notices_do_not_touch_status() {
        let status = MemoryStatus::new();
        status.publish("shown");
        status.notify("alert");
        assert_eq!(status.current().as_deref(), Some("shown"));
        assert_eq!(status.notices(), vec!["alert".to_string()]);
    }
}
