//! Page-side collaborators: the status region and the button container.

use crate::bindings::JsElement;
use pay_core::{Affordance, PaymentError, PaymentResult, StatusSink};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

/// Element id of the status region
pub const MESSAGES_ID: &str = "messages";

/// Element id of the wallet button container
pub const BUTTON_CONTAINER_ID: &str = "payment-request-button";

/// Where the connector leaves the button it created
pub type ButtonSlot = Rc<RefCell<Option<JsElement>>>;

/// Best-effort message out of a thrown JS value
pub fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Look up an element by id as an `HtmlElement`
pub fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// Status region rendered through `innerText`. A page without the
/// region still works; messages are dropped.
pub struct DomStatus {
    region: Option<HtmlElement>,
}

impl DomStatus {
    pub fn new(region: Option<HtmlElement>) -> Self {
        Self { region }
    }

    pub fn from_document(document: &Document) -> Self {
        Self::new(html_element(document, MESSAGES_ID))
    }
}

impl StatusSink for DomStatus {
    fn publish(&self, message: &str) {
        if let Some(region) = &self.region {
            region.set_inner_text(message);
        }
    }

    fn notify(&self, notice: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.alert_with_message(notice) {
            warn!("alert failed: {}", js_message(&err));
        }
    }
}

/// The `#payment-request-button` container
pub struct DomAffordance {
    container: HtmlElement,
    button: ButtonSlot,
}

impl DomAffordance {
    pub fn new(container: HtmlElement, button: ButtonSlot) -> Self {
        Self { container, button }
    }
}

impl Affordance for DomAffordance {
    fn mount(&self) -> PaymentResult<()> {
        let slot = self.button.borrow();
        let button = slot.as_ref().ok_or_else(|| {
            PaymentError::Affordance("wallet button was never created".to_string())
        })?;
        button
            .mount(&self.container)
            .map_err(|err| PaymentError::Affordance(js_message(&err)))
    }

    fn hide(&self) -> PaymentResult<()> {
        self.container
            .style()
            .set_property("display", "none")
            .map_err(|err| PaymentError::Affordance(js_message(&err)))
    }
}
