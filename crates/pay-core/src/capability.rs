//! # Capability Gate
//!
//! Decides once per page load whether the wallet button is shown.

use crate::error::PaymentResult;
use crate::gateway::{SharedAffordance, SharedGateway, SharedStatus};
use crate::messages;
use tracing::{debug, info, instrument};

/// What the gate did with the affordance container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Device capable, button mounted
    Mounted,
    /// Device not capable, container hidden and status published
    Hidden,
    /// No container on the page, nothing touched
    Absent,
}

/// One-shot capability gate.
///
/// `evaluate` consumes the gate, so the check cannot run twice.
pub struct CapabilityGate {
    gateway: SharedGateway,
    affordance: Option<SharedAffordance>,
    status: SharedStatus,
}

impl CapabilityGate {
    pub fn new(
        gateway: SharedGateway,
        affordance: Option<SharedAffordance>,
        status: SharedStatus,
    ) -> Self {
        Self {
            gateway,
            affordance,
            status,
        }
    }

    /// Run the capability check and mount or hide the container.
    ///
    /// A failing check is returned as an error; the caller treats it as an
    /// initialization failure.
    #[instrument(skip(self), fields(provider = self.gateway.provider_name()))]
    pub async fn evaluate(self) -> PaymentResult<GateDecision> {
        let capable = self.gateway.can_make_payment().await?;
        debug!("Capability check resolved: {}", capable);

        let Some(affordance) = self.affordance else {
            debug!("No affordance container present, skipping mount");
            return Ok(GateDecision::Absent);
        };

        if capable {
            affordance.mount()?;
            info!("Wallet button mounted");
            Ok(GateDecision::Mounted)
        } else {
            affordance.hide()?;
            self.status.publish(messages::WALLET_UNSUPPORTED);
            info!("Wallet not supported on this device, button hidden");
            Ok(GateDecision::Hidden)
        }
    }
}
