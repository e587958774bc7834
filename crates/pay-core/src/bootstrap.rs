//! # Checkout Bootstrap
//!
//! Page setup: fetch the publishable key, connect the processor, run the
//! capability gate once, and subscribe to wallet events. Any failure here
//! is fatal for the page: the status region explains it and no session is
//! returned, so the wallet button cannot be used.

use crate::capability::{CapabilityGate, GateDecision};
use crate::error::{PaymentError, PaymentResult};
use crate::event::{event_channel, EventReceiver};
use crate::gateway::{GatewayConnector, SharedAffordance, SharedIssuer, SharedStatus};
use crate::messages;
use crate::orchestrator::{AttemptReport, AuthorizationOrchestrator};
use crate::request::TransactionRequest;
use tracing::{error, info, instrument};

/// Everything needed to bring a checkout page up
pub struct CheckoutBootstrap<C> {
    issuer: SharedIssuer,
    connector: C,
    status: SharedStatus,
    affordance: Option<SharedAffordance>,
    request: TransactionRequest,
}

impl<C: GatewayConnector> CheckoutBootstrap<C> {
    pub fn new(
        issuer: SharedIssuer,
        connector: C,
        status: SharedStatus,
        request: TransactionRequest,
    ) -> Self {
        Self {
            issuer,
            connector,
            status,
            affordance: None,
            request,
        }
    }

    /// Builder: the container the wallet button is mounted into
    pub fn with_affordance(mut self, affordance: SharedAffordance) -> Self {
        self.affordance = Some(affordance);
        self
    }

    /// Bring the page up. On failure the status region has already been
    /// updated, a notice raised, and the error is returned for logging.
    #[instrument(
        skip(self),
        fields(amount = self.request.amount(), currency = %self.request.currency())
    )]
    pub async fn initialize(self) -> PaymentResult<CheckoutSession> {
        let status = self.status.clone();
        match self.try_initialize().await {
            Ok(session) => Ok(session),
            Err(err) => {
                error!("Checkout initialization failed: {}", err);
                // The missing-key path has already shown its own message.
                if !matches!(err, PaymentError::MissingPublishableKey) {
                    let message = messages::initialization_failed(&err);
                    status.publish(&message);
                    status.notify(&message);
                }
                Err(err)
            }
        }
    }

    async fn try_initialize(self) -> PaymentResult<CheckoutSession> {
        let config = self.issuer.fetch_config().await?;
        let Some(publishable_key) = config.publishable_key() else {
            self.status.publish(messages::MISSING_PUBLISHABLE_KEY);
            self.status.notify(messages::CONFIGURE_KEY_NOTICE);
            return Err(PaymentError::MissingPublishableKey);
        };

        let gateway = self
            .connector
            .connect(publishable_key, &self.request)
            .await?;
        info!(
            "Connected to {} for {} ({})",
            gateway.provider_name(),
            self.request.display_total(),
            self.request.label()
        );

        let decision = CapabilityGate::new(
            gateway.clone(),
            self.affordance.clone(),
            self.status.clone(),
        )
        .evaluate()
        .await?;

        let (sender, events) = event_channel();
        gateway.subscribe(sender)?;

        let orchestrator = AuthorizationOrchestrator::new(
            self.issuer,
            gateway,
            self.status,
            self.request.currency(),
        );

        Ok(CheckoutSession {
            orchestrator,
            events,
            decision,
        })
    }
}

/// A page that finished setup and is listening for wallet events
pub struct CheckoutSession {
    orchestrator: AuthorizationOrchestrator,
    events: EventReceiver,
    decision: GateDecision,
}

impl CheckoutSession {
    /// What the capability gate decided
    pub fn decision(&self) -> GateDecision {
        self.decision
    }

    /// Split into the orchestrator and the raw event stream, for hosts that
    /// run each attempt as its own task
    pub fn into_parts(self) -> (AuthorizationOrchestrator, EventReceiver) {
        (self.orchestrator, self.events)
    }

    /// Authorize the next delivered event, or `ChannelClosed` once the
    /// gateway has dropped its sender
    pub async fn next(&mut self) -> PaymentResult<AttemptReport> {
        let event = self.events.recv().await.ok_or(PaymentError::ChannelClosed)?;
        Ok(self.orchestrator.authorize(event).await)
    }

    /// Authorize events in arrival order until the gateway goes away.
    /// Returns the number of attempts run.
    pub async fn run(mut self) -> usize {
        let mut attempts = 0;
        while let Some(event) = self.events.recv().await {
            self.orchestrator.authorize(event).await;
            attempts += 1;
        }
        info!("Event channel closed after {} attempts", attempts);
        attempts
    }
}
