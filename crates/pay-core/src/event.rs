//! # Payment-Method Events
//!
//! A payment-method event is the handoff from the wallet sheet to the
//! orchestrator: an approved payment method plus a one-shot responder the
//! sheet waits on. The responder is sealed at construction and consumed by
//! [`Completion::complete`], so a second completion does not type-check.
//! Dropping an unresolved responder resolves it with `fail`.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Outcome reported back to the wallet sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionOutcome {
    Success,
    Fail,
}

impl CompletionOutcome {
    /// The string the processor's `complete()` expects
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionOutcome::Success => "success",
            CompletionOutcome::Fail => "fail",
        }
    }
}

impl std::fmt::Display for CompletionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processor token for the approved payment method (e.g. `pm_...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receiving half of a completion; held by whoever owns the wallet sheet
pub type CompletionReceiver = oneshot::Receiver<CompletionOutcome>;

/// Single-use responder for one payment-method event
#[derive(Debug)]
pub struct Completion {
    responder: Option<oneshot::Sender<CompletionOutcome>>,
}

impl Completion {
    /// Create a sealed responder and the receiver the sheet waits on
    pub fn channel() -> (Self, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        (Self { responder: Some(tx) }, rx)
    }

    /// Resolve the event. Consumes the responder.
    pub fn complete(mut self, outcome: CompletionOutcome) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: CompletionOutcome) {
        if let Some(tx) = self.responder.take() {
            // The sheet may already be gone; nothing left to signal then.
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.responder.is_some() {
            warn!("Payment-method event dropped without completion, reporting fail");
            self.send(CompletionOutcome::Fail);
        }
    }
}

/// A user-approved request to pay
#[derive(Debug)]
pub struct PaymentMethodEvent {
    pub payment_method: PaymentMethodId,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    pub completion: Completion,
}

impl PaymentMethodEvent {
    /// Create an event and the receiver its completion will arrive on
    pub fn new(payment_method: PaymentMethodId) -> (Self, CompletionReceiver) {
        let (completion, rx) = Completion::channel();
        (
            Self {
                payment_method,
                payer_name: None,
                payer_email: None,
                completion,
            },
            rx,
        )
    }

    /// Builder: attach payer details returned by the wallet
    pub fn with_payer(mut self, name: Option<String>, email: Option<String>) -> Self {
        self.payer_name = name;
        self.payer_email = email;
        self
    }
}

/// Sending half of the event channel, handed to the gateway on subscribe
pub type EventSender = mpsc::UnboundedSender<PaymentMethodEvent>;

/// Receiving half of the event channel, drained by the checkout session
pub type EventReceiver = mpsc::UnboundedReceiver<PaymentMethodEvent>;

/// Create the channel wallet events travel on
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
