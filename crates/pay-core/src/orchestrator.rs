//! # Authorization Orchestrator
//!
//! Turns one approved payment method into a confirmed (or failed) charge.
//!
//! ```text
//! Idle ─► MethodApproved ─► IntentRequested ─► Confirming ─┬─► Succeeded
//!                                 │                        ├─► Failed
//!                                 └─► Failed               └─► ChallengeRequired
//!                                                                  │ complete(success)
//!                                                                  ▼
//!                                                             ReConfirming ─► Succeeded | Failed
//! ```
//!
//! The wallet sheet's completion is resolved exactly once per event, and
//! always before a challenge reconfirmation starts. Every step waits for
//! the previous network call; nothing within an attempt runs in parallel.

use crate::error::{PaymentError, PaymentResult};
use crate::event::{Completion, CompletionOutcome, PaymentMethodEvent, PaymentMethodId};
use crate::gateway::{SharedGateway, SharedIssuer, SharedStatus};
use crate::intent::{ConfirmRequest, ConfirmationResult, IntentRequest, IntentStatus};
use crate::messages;
use crate::request::Currency;
use tracing::{debug, error, info, instrument, warn};

/// Where an attempt currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    Idle,
    MethodApproved,
    IntentRequested,
    Confirming,
    ChallengeRequired,
    ReConfirming,
    Succeeded,
    Failed,
}

impl AuthorizationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthorizationState::Succeeded | AuthorizationState::Failed
        )
    }

    /// True once a confirmation call has been issued
    fn is_confirming(&self) -> bool {
        matches!(
            self,
            AuthorizationState::Confirming
                | AuthorizationState::ChallengeRequired
                | AuthorizationState::ReConfirming
        )
    }
}

/// Summary of one finished attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    pub final_state: AuthorizationState,
    /// What the wallet sheet was told
    pub completion: CompletionOutcome,
    /// Confirmation calls issued (0, 1 or 2)
    pub confirmations: u8,
    /// Last message published to the status region
    pub status: String,
}

/// Per-event bookkeeping. Never shared between attempts.
struct Attempt {
    state: AuthorizationState,
    completion: Option<Completion>,
    outcome: Option<CompletionOutcome>,
    confirmations: u8,
}

impl Attempt {
    fn new(completion: Completion) -> Self {
        Self {
            state: AuthorizationState::Idle,
            completion: Some(completion),
            outcome: None,
            confirmations: 0,
        }
    }

    fn advance(&mut self, next: AuthorizationState) {
        debug!("Authorization {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Resolve the wallet sheet. Later calls are no-ops.
    fn complete(&mut self, outcome: CompletionOutcome) {
        if let Some(completion) = self.completion.take() {
            debug!("Completing payment-method event: {}", outcome);
            completion.complete(outcome);
            self.outcome = Some(outcome);
        }
    }

    fn fail(&mut self) {
        self.complete(CompletionOutcome::Fail);
        self.advance(AuthorizationState::Failed);
    }

    fn succeed(&mut self) {
        self.complete(CompletionOutcome::Success);
        self.advance(AuthorizationState::Succeeded);
    }

    fn into_report(mut self, status: String) -> AttemptReport {
        // Every path resolves before getting here; fail closed regardless.
        if !self.state.is_terminal() {
            warn!("Attempt left in {:?}; marking it failed", self.state);
            self.fail();
        }
        self.complete(CompletionOutcome::Fail);
        AttemptReport {
            final_state: self.state,
            completion: self.outcome.unwrap_or(CompletionOutcome::Fail),
            confirmations: self.confirmations,
            status,
        }
    }
}

/// Drives payment-method events to a terminal state.
///
/// Cloning is cheap; clones share collaborators but no attempt state, so
/// events delivered concurrently run as independent attempts whose only
/// common resource is the status region.
#[derive(Clone)]
pub struct AuthorizationOrchestrator {
    issuer: SharedIssuer,
    gateway: SharedGateway,
    status: SharedStatus,
    currency: Currency,
}

impl AuthorizationOrchestrator {
    pub fn new(
        issuer: SharedIssuer,
        gateway: SharedGateway,
        status: SharedStatus,
        currency: Currency,
    ) -> Self {
        Self {
            issuer,
            gateway,
            status,
            currency,
        }
    }

    /// Run one event to completion and publish its final status.
    #[instrument(skip(self, event), fields(payment_method = %event.payment_method))]
    pub async fn authorize(&self, event: PaymentMethodEvent) -> AttemptReport {
        let PaymentMethodEvent {
            payment_method,
            completion,
            ..
        } = event;

        let mut attempt = Attempt::new(completion);
        attempt.advance(AuthorizationState::MethodApproved);

        let status = match self.drive(&mut attempt, &payment_method).await {
            Ok(status) => status,
            Err(err) => {
                error!("Authorization failed in {:?}: {}", attempt.state, err);
                let status = if attempt.state.is_confirming() {
                    messages::confirmation_failed(&err)
                } else {
                    messages::issuance_failed(&err)
                };
                attempt.fail();
                status
            }
        };

        self.status.publish(&status);
        let report = attempt.into_report(status);
        info!(
            "Authorization finished: state={:?}, completion={}, confirmations={}",
            report.final_state, report.completion, report.confirmations
        );
        report
    }

    /// The happy and expected-failure paths. Returns the status to publish;
    /// `Err` is reserved for transport failures and other surprises.
    async fn drive(
        &self,
        attempt: &mut Attempt,
        payment_method: &PaymentMethodId,
    ) -> PaymentResult<String> {
        attempt.advance(AuthorizationState::IntentRequested);
        let response = self
            .issuer
            .create_intent(&IntentRequest::card(self.currency))
            .await?;

        let secret = match response.into_secret() {
            Ok(secret) => secret,
            Err(message) => {
                warn!("Intent issuance rejected: {}", message);
                attempt.fail();
                return Ok(message);
            }
        };
        debug!("Client secret returned for intent {}", secret.intent_id());

        attempt.advance(AuthorizationState::Confirming);
        let result = self
            .confirm(attempt, ConfirmRequest::initial(&secret, payment_method))
            .await?;

        if let Some(message) = result.rejection() {
            warn!("Confirmation rejected: {}", message);
            attempt.fail();
            return Ok(message);
        }

        if !result.requires_action() {
            attempt.succeed();
            return Ok(result.status_line());
        }

        // The sheet is done; authentication continues outside it.
        attempt.advance(AuthorizationState::ChallengeRequired);
        attempt.complete(CompletionOutcome::Success);

        attempt.advance(AuthorizationState::ReConfirming);
        let result = self
            .confirm(attempt, ConfirmRequest::challenge(&secret))
            .await?;

        if let Some(message) = result.rejection() {
            warn!("Challenge confirmation rejected: {}", message);
            attempt.advance(AuthorizationState::Failed);
            return Ok(message);
        }

        let terminal = match result.status() {
            Some(IntentStatus::Failed) => AuthorizationState::Failed,
            _ => AuthorizationState::Succeeded,
        };
        attempt.advance(terminal);
        Ok(result.status_line())
    }

    async fn confirm(
        &self,
        attempt: &mut Attempt,
        request: ConfirmRequest<'_>,
    ) -> PaymentResult<ConfirmationResult> {
        if attempt.confirmations >= 2 {
            return Err(PaymentError::Internal(
                "confirmation attempted more than twice".to_string(),
            ));
        }
        attempt.confirmations += 1;
        debug!(
            "Confirming intent {} (attempt {}, handle_actions={})",
            request.secret.intent_id(),
            attempt.confirmations,
            request.handle_actions
        );
        self.gateway.confirm(request).await
    }
}
