//! Raw Stripe.js v3 handles used by the payment request button.
//!
//! Only the calls the checkout page makes are bound; everything else about
//! Stripe.js stays on the JS side.

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `Stripe(publishableKey, options)` client
    #[derive(Debug, Clone)]
    pub type JsStripe;

    /// `stripe.elements()` factory
    #[derive(Debug, Clone)]
    pub type JsElements;

    /// A mounted (or mountable) Stripe element
    #[derive(Debug, Clone)]
    pub type JsElement;

    /// `stripe.paymentRequest(...)` handle
    #[derive(Debug, Clone)]
    pub type JsPaymentRequest;

    /// Event delivered to `paymentRequest.on('paymentmethod', ...)`
    #[derive(Debug, Clone)]
    pub type JsPaymentMethodEvent;

    /// Throws a `ReferenceError` when Stripe.js has not been loaded.
    #[wasm_bindgen(catch, js_name = Stripe)]
    pub fn new_stripe(publishable_key: &str, options: &JsValue) -> Result<JsStripe, JsValue>;

    #[wasm_bindgen(method, catch, js_name = paymentRequest)]
    pub fn payment_request(
        this: &JsStripe,
        options: &JsValue,
    ) -> Result<JsPaymentRequest, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn elements(this: &JsStripe) -> Result<JsElements, JsValue>;

    /// `stripe.confirmCardPayment(clientSecret, data?, options?)` → `{ paymentIntent?, error? }`
    #[wasm_bindgen(method, catch, js_name = confirmCardPayment)]
    pub fn confirm_card_payment(
        this: &JsStripe,
        client_secret: &str,
        data: &JsValue,
        options: &JsValue,
    ) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = create)]
    pub fn create_element(
        this: &JsElements,
        element_type: &str,
        options: &JsValue,
    ) -> Result<JsElement, JsValue>;

    /// Accepts a selector string or a DOM element
    #[wasm_bindgen(method, catch)]
    pub fn mount(this: &JsElement, target: &JsValue) -> Result<(), JsValue>;

    /// Resolves to `null` when no wallet is available
    #[wasm_bindgen(method, catch, js_name = canMakePayment)]
    pub fn can_make_payment(this: &JsPaymentRequest) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method)]
    pub fn on(this: &JsPaymentRequest, event: &str, handler: &Function);

    #[wasm_bindgen(method, getter, js_name = paymentMethod)]
    pub fn payment_method(this: &JsPaymentMethodEvent) -> JsValue;

    #[wasm_bindgen(method, getter, js_name = payerName)]
    pub fn payer_name(this: &JsPaymentMethodEvent) -> Option<String>;

    #[wasm_bindgen(method, getter, js_name = payerEmail)]
    pub fn payer_email(this: &JsPaymentMethodEvent) -> Option<String>;

    /// Close the wallet sheet with `"success"` or `"fail"`
    #[wasm_bindgen(method)]
    pub fn complete(this: &JsPaymentMethodEvent, status: &str);
}
