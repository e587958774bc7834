//! Recording fakes of the collaborator traits, shared by the unit tests.

use crate::error::{PaymentError, PaymentResult};
use crate::event::{CompletionOutcome, CompletionReceiver, EventSender};
use crate::gateway::{Affordance, GatewayConnector, IntentIssuer, PaymentGateway, SharedGateway};
use crate::intent::{
    ClientConfig, ConfirmRequest, ConfirmationResult, IntentRequest, IntentResponse,
};
use crate::request::TransactionRequest;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tokio::sync::oneshot::error::TryRecvError;

pub struct FakeIssuer {
    pub publishable_key: Option<String>,
    pub responses: RefCell<VecDeque<PaymentResult<IntentResponse>>>,
    pub requests: RefCell<Vec<IntentRequest>>,
}

impl FakeIssuer {
    pub fn with_key(key: &str) -> Self {
        Self {
            publishable_key: Some(key.to_string()),
            responses: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn issuing(responses: Vec<PaymentResult<IntentResponse>>) -> Self {
        let issuer = Self::with_key("pk_test_123");
        issuer.responses.borrow_mut().extend(responses);
        issuer
    }
}

#[async_trait(?Send)]
impl IntentIssuer for FakeIssuer {
    async fn fetch_config(&self) -> PaymentResult<ClientConfig> {
        Ok(ClientConfig {
            publishable_key: self.publishable_key.clone(),
        })
    }

    async fn create_intent(&self, request: &IntentRequest) -> PaymentResult<IntentResponse> {
        self.requests.borrow_mut().push(request.clone());
        tokio::task::yield_now().await;
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(PaymentError::Internal("no scripted intent".into())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedConfirm {
    pub secret: String,
    pub payment_method: Option<String>,
    pub handle_actions: bool,
}

#[derive(Default)]
pub struct FakeGateway {
    pub capable: Option<bool>,
    pub results: RefCell<VecDeque<PaymentResult<ConfirmationResult>>>,
    /// Scripted results for a specific client secret, used before `results`
    pub results_by_secret: RefCell<HashMap<String, VecDeque<PaymentResult<ConfirmationResult>>>>,
    pub calls: RefCell<Vec<RecordedConfirm>>,
    pub subscriber: RefCell<Option<EventSender>>,
    /// Completion checked when a challenge confirmation starts
    pub watched_completion: RefCell<Option<CompletionReceiver>>,
    pub seen_at_challenge: Cell<Option<CompletionOutcome>>,
}

impl FakeGateway {
    pub fn capable(capable: bool) -> Self {
        Self {
            capable: Some(capable),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn confirming(results: Vec<PaymentResult<ConfirmationResult>>) -> Self {
        let gateway = Self::capable(true);
        gateway.results.borrow_mut().extend(results);
        gateway
    }

    pub fn confirming_per_secret(
        scripts: Vec<(&str, Vec<PaymentResult<ConfirmationResult>>)>,
    ) -> Self {
        let gateway = Self::capable(true);
        gateway.results_by_secret.borrow_mut().extend(
            scripts
                .into_iter()
                .map(|(secret, results)| (secret.to_string(), results.into())),
        );
        gateway
    }

    pub fn watch_completion(&self, rx: CompletionReceiver) {
        *self.watched_completion.borrow_mut() = Some(rx);
    }
}

#[async_trait(?Send)]
impl PaymentGateway for FakeGateway {
    async fn can_make_payment(&self) -> PaymentResult<bool> {
        self.capable
            .ok_or_else(|| PaymentError::CapabilityCheck("payment request API missing".into()))
    }

    async fn confirm(&self, request: ConfirmRequest<'_>) -> PaymentResult<ConfirmationResult> {
        if request.handle_actions {
            if let Some(rx) = self.watched_completion.borrow_mut().as_mut() {
                match rx.try_recv() {
                    Ok(outcome) => self.seen_at_challenge.set(Some(outcome)),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => {}
                }
            }
        }
        let secret = request.secret.expose().to_string();
        self.calls.borrow_mut().push(RecordedConfirm {
            secret: secret.clone(),
            payment_method: request.payment_method.map(|m| m.as_str().to_string()),
            handle_actions: request.handle_actions,
        });
        tokio::task::yield_now().await;

        let scripted = self
            .results_by_secret
            .borrow_mut()
            .get_mut(&secret)
            .and_then(|results| results.pop_front());
        scripted
            .or_else(|| self.results.borrow_mut().pop_front())
            .unwrap_or_else(|| Err(PaymentError::Internal("no scripted confirmation".into())))
    }

    fn subscribe(&self, events: EventSender) -> PaymentResult<()> {
        *self.subscriber.borrow_mut() = Some(events);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Default)]
pub struct FakeAffordance {
    pub mounted: Cell<bool>,
    pub hidden: Cell<bool>,
}

impl Affordance for FakeAffordance {
    fn mount(&self) -> PaymentResult<()> {
        self.mounted.set(true);
        Ok(())
    }

    fn hide(&self) -> PaymentResult<()> {
        self.hidden.set(true);
        Ok(())
    }
}

pub struct FakeConnector {
    pub gateway: Option<Rc<FakeGateway>>,
    pub connected_with: Rc<RefCell<Option<String>>>,
    /// Error returned when there is no gateway
    pub failure: fn() -> PaymentError,
}

impl FakeConnector {
    pub fn to(gateway: Rc<FakeGateway>) -> Self {
        Self {
            gateway: Some(gateway),
            connected_with: Rc::new(RefCell::new(None)),
            failure: || PaymentError::Internal("unused".into()),
        }
    }

    pub fn broken() -> Self {
        Self::failing(|| PaymentError::ProcessorInit("Stripe.js returned null".into()))
    }

    pub fn failing(failure: fn() -> PaymentError) -> Self {
        Self {
            gateway: None,
            connected_with: Rc::new(RefCell::new(None)),
            failure,
        }
    }
}

#[async_trait(?Send)]
impl GatewayConnector for FakeConnector {
    async fn connect(
        &self,
        publishable_key: &str,
        _request: &TransactionRequest,
    ) -> PaymentResult<SharedGateway> {
        *self.connected_with.borrow_mut() = Some(publishable_key.to_string());
        match &self.gateway {
            Some(gateway) => Ok(gateway.clone() as SharedGateway),
            None => Err((self.failure)()),
        }
    }
}
