//! # Stripe.js Gateway
//!
//! `PaymentGateway` over the browser's Stripe.js client. Confirmations go
//! through `confirmCardPayment`, which can open its own 3-D Secure frame
//! on the challenge reconfirmation. Wallet sheet events are forwarded into
//! the core's event channel; the sheet is closed once the core resolves
//! the event's completion.

use crate::bindings::{new_stripe, JsElement, JsPaymentMethodEvent, JsPaymentRequest, JsStripe};
use crate::dom::{js_message, ButtonSlot};
use async_trait::async_trait;
use pay_core::{
    CompletionOutcome, ConfirmRequest, ConfirmationResult, EventSender, GatewayConnector,
    PaymentError, PaymentGateway, PaymentMethodEvent, PaymentMethodId, PaymentResult,
    SharedGateway, TransactionRequest,
};
use pay_stripe::STRIPE_API_VERSION;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StripeOptions {
    api_version: &'static str,
}

#[derive(Debug, PartialEq, Serialize)]
struct PaymentTotal<'a> {
    label: &'a str,
    amount: i64,
}

/// Options for `stripe.paymentRequest`
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequestOptions<'a> {
    country: &'a str,
    currency: &'static str,
    total: PaymentTotal<'a>,
    request_payer_name: bool,
    request_payer_email: bool,
    disable_wallets: Vec<&'static str>,
}

impl<'a> From<&'a TransactionRequest> for PaymentRequestOptions<'a> {
    fn from(request: &'a TransactionRequest) -> Self {
        Self {
            country: request.country(),
            currency: request.currency().as_str(),
            total: PaymentTotal {
                label: request.label(),
                amount: request.amount(),
            },
            request_payer_name: request.payer_name_required(),
            request_payer_email: request.payer_email_required(),
            disable_wallets: request
                .disabled_methods()
                .iter()
                .map(|method| method.as_str())
                .collect(),
        }
    }
}

/// `data` argument of `confirmCardPayment`
#[derive(Debug, PartialEq, Serialize)]
struct ConfirmData<'a> {
    payment_method: &'a str,
}

/// `options` argument of `confirmCardPayment`
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmOptions {
    handle_actions: bool,
}

/// Which optional arguments a confirmation passes. The reconfirmation
/// passes neither, leaving Stripe.js on its defaults.
fn confirm_arguments<'a>(
    request: &ConfirmRequest<'a>,
) -> (Option<ConfirmData<'a>>, Option<ConfirmOptions>) {
    let data = request.payment_method.map(|method| ConfirmData {
        payment_method: method.as_str(),
    });
    let options = (!request.handle_actions).then_some(ConfirmOptions {
        handle_actions: false,
    });
    (data, options)
}

fn to_js<T: Serialize>(value: &T) -> PaymentResult<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| PaymentError::Serialization(e.to_string()))
}

fn optional_js<T: Serialize>(value: Option<T>) -> PaymentResult<JsValue> {
    value.map_or(Ok(JsValue::UNDEFINED), |value| to_js(&value))
}

fn init_error(err: JsValue) -> PaymentError {
    PaymentError::ProcessorInit(js_message(&err))
}

/// Stripe.js client plus the payment request for one transaction
pub struct StripeJsGateway {
    stripe: JsStripe,
    payment_request: JsPaymentRequest,
    listener: RefCell<Option<Closure<dyn FnMut(JsPaymentMethodEvent)>>>,
}

impl StripeJsGateway {
    pub fn new(publishable_key: &str, request: &TransactionRequest) -> PaymentResult<Self> {
        let options = to_js(&StripeOptions {
            api_version: STRIPE_API_VERSION,
        })?;
        let stripe = new_stripe(publishable_key, &options).map_err(init_error)?;
        let payment_request = stripe
            .payment_request(&to_js(&PaymentRequestOptions::from(request))?)
            .map_err(init_error)?;

        Ok(Self {
            stripe,
            payment_request,
            listener: RefCell::new(None),
        })
    }

    /// Create the `paymentRequestButton` element, unmounted
    pub fn create_button(&self) -> PaymentResult<JsElement> {
        let elements = self.stripe.elements().map_err(init_error)?;
        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &JsValue::from_str("paymentRequest"),
            &self.payment_request,
        )
        .map_err(init_error)?;
        elements
            .create_element("paymentRequestButton", &options)
            .map_err(init_error)
    }
}

/// Hand one wallet sheet event to the core and close the sheet when its
/// completion resolves. A dropped completion resolves as `fail`.
fn forward(events: &EventSender, js_event: JsPaymentMethodEvent) {
    let id = js_sys::Reflect::get(&js_event.payment_method(), &JsValue::from_str("id"))
        .ok()
        .and_then(|id| id.as_string())
        .unwrap_or_default();
    debug!("Wallet sheet approved payment method {}", id);

    let (event, completion) = PaymentMethodEvent::new(PaymentMethodId::new(id));
    let event = event.with_payer(js_event.payer_name(), js_event.payer_email());
    if events.send(event).is_err() {
        warn!("Checkout session is gone; the wallet sheet will be failed");
    }

    spawn_local(async move {
        let outcome = completion.await.unwrap_or(CompletionOutcome::Fail);
        js_event.complete(outcome.as_str());
    });
}

#[async_trait(?Send)]
impl PaymentGateway for StripeJsGateway {
    async fn can_make_payment(&self) -> PaymentResult<bool> {
        let check = |err: JsValue| PaymentError::CapabilityCheck(js_message(&err));
        let promise = self.payment_request.can_make_payment().map_err(check)?;
        let result = JsFuture::from(promise).await.map_err(check)?;
        Ok(result.is_truthy())
    }

    async fn confirm(&self, request: ConfirmRequest<'_>) -> PaymentResult<ConfirmationResult> {
        let (data, options) = confirm_arguments(&request);
        let network = |err: JsValue| PaymentError::NetworkError(js_message(&err));

        let promise = self
            .stripe
            .confirm_card_payment(
                request.secret.expose(),
                &optional_js(data)?,
                &optional_js(options)?,
            )
            .map_err(network)?;
        let value = JsFuture::from(promise).await.map_err(network)?;

        serde_wasm_bindgen::from_value(value)
            .map_err(|e| PaymentError::Serialization(e.to_string()))
    }

    fn subscribe(&self, events: EventSender) -> PaymentResult<()> {
        let handler = Closure::<dyn FnMut(JsPaymentMethodEvent)>::new(
            move |js_event: JsPaymentMethodEvent| forward(&events, js_event),
        );
        self.payment_request
            .on("paymentmethod", handler.as_ref().unchecked_ref());
        *self.listener.borrow_mut() = Some(handler);
        info!("Listening for wallet payment methods");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "stripe.js"
    }
}

/// Builds `StripeJsGateway`s and leaves the button for the page container
pub struct StripeJsConnector {
    button: ButtonSlot,
}

impl StripeJsConnector {
    pub fn new(button: ButtonSlot) -> Self {
        Self { button }
    }
}

#[async_trait(?Send)]
impl GatewayConnector for StripeJsConnector {
    async fn connect(
        &self,
        publishable_key: &str,
        request: &TransactionRequest,
    ) -> PaymentResult<SharedGateway> {
        let gateway = StripeJsGateway::new(publishable_key, request)?;
        *self.button.borrow_mut() = Some(gateway.create_button()?);
        Ok(Rc::new(gateway))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{Currency, IntentSecret, WalletMethod};

    #[test]
    fn test_payment_request_options_shape() {
        let request = TransactionRequest::default();
        let value = serde_json::to_value(PaymentRequestOptions::from(&request)).unwrap();

        assert_eq!(value["country"], "US");
        assert_eq!(value["currency"], "usd");
        assert_eq!(value["total"]["label"], "Demo total");
        assert_eq!(value["total"]["amount"], 1999);
        assert_eq!(value["requestPayerName"], true);
        assert_eq!(value["requestPayerEmail"], true);
        assert_eq!(value["disableWallets"], serde_json::json!(["googlePay", "browserCard"]));
    }

    #[test]
    fn test_options_follow_request() {
        let request = TransactionRequest::new("GB", Currency::GBP, 500, "Tea")
            .unwrap()
            .disable(WalletMethod::Link);
        let options = PaymentRequestOptions::from(&request);

        assert_eq!(options.currency, "gbp");
        assert!(!options.request_payer_name);
        assert_eq!(options.disable_wallets, vec!["link"]);
    }

    #[test]
    fn test_initial_confirmation_arguments() {
        let secret = IntentSecret::new("pi_1_secret_x");
        let method = PaymentMethodId::new("pm_card");
        let (data, options) = confirm_arguments(&ConfirmRequest::initial(&secret, &method));

        assert_eq!(data, Some(ConfirmData { payment_method: "pm_card" }));
        assert_eq!(
            serde_json::to_value(options).unwrap(),
            serde_json::json!({ "handleActions": false })
        );
    }

    #[test]
    fn test_challenge_confirmation_uses_defaults() {
        let secret = IntentSecret::new("pi_1_secret_x");
        let (data, options) = confirm_arguments(&ConfirmRequest::challenge(&secret));

        assert!(data.is_none());
        assert!(options.is_none());
    }
}
