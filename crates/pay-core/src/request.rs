//! # Transaction Request
//!
//! The immutable description of what the wallet sheet asks the customer to
//! pay. Built once per page load, optionally from `config/checkout.toml`.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::JPY => "jpy",
            Currency::CAD => "cad",
            Currency::AUD => "aud",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Format an amount in the smallest unit for display (e.g. "$19.99")
    pub fn format_minor(&self, amount: i64) -> String {
        let symbol = match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
        };
        match self.decimal_places() {
            0 => format!("{}{}", symbol, amount),
            places => {
                let divisor = 10_f64.powi(places as i32);
                format!("{}{:.2}", symbol, amount as f64 / divisor)
            }
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Wallets the payment sheet can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletMethod {
    ApplePay,
    GooglePay,
    Link,
    BrowserCard,
}

impl WalletMethod {
    /// Identifier used by the processor's `disableWallets` option
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletMethod::ApplePay => "applePay",
            WalletMethod::GooglePay => "googlePay",
            WalletMethod::Link => "link",
            WalletMethod::BrowserCard => "browserCard",
        }
    }
}

/// Everything the payment sheet needs to describe the charge.
///
/// Fields are private; the value cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    country: String,
    currency: Currency,
    /// Amount in smallest currency unit (cents for USD)
    amount: i64,
    label: String,
    #[serde(default)]
    payer_name_required: bool,
    #[serde(default)]
    payer_email_required: bool,
    #[serde(default)]
    disabled_methods: BTreeSet<WalletMethod>,
}

impl TransactionRequest {
    /// Create a request for `amount` minor units with the given sheet label
    pub fn new(
        country: impl Into<String>,
        currency: Currency,
        amount: i64,
        label: impl Into<String>,
    ) -> PaymentResult<Self> {
        let request = Self {
            country: country.into(),
            currency,
            amount,
            label: label.into(),
            payer_name_required: false,
            payer_email_required: false,
            disabled_methods: BTreeSet::new(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Builder: ask the wallet for the payer's name
    pub fn require_payer_name(mut self) -> Self {
        self.payer_name_required = true;
        self
    }

    /// Builder: ask the wallet for the payer's email
    pub fn require_payer_email(mut self) -> Self {
        self.payer_email_required = true;
        self
    }

    /// Builder: never offer `method` in the sheet
    pub fn disable(mut self, method: WalletMethod) -> Self {
        self.disabled_methods.insert(method);
        self
    }

    /// Parse from TOML (the `config/checkout.toml` format)
    pub fn from_toml(content: &str) -> PaymentResult<Self> {
        let request: Self = toml::from_str(content)
            .map_err(|e| PaymentError::Configuration(format!("Invalid checkout config: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> PaymentResult<()> {
        if self.amount <= 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "Amount must be positive, got {}",
                self.amount
            )));
        }
        if self.country.len() != 2 {
            return Err(PaymentError::InvalidRequest(format!(
                "Country must be a two-letter code, got {:?}",
                self.country
            )));
        }
        if self.label.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("Label is empty".to_string()));
        }
        Ok(())
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn payer_name_required(&self) -> bool {
        self.payer_name_required
    }

    pub fn payer_email_required(&self) -> bool {
        self.payer_email_required
    }

    pub fn disabled_methods(&self) -> &BTreeSet<WalletMethod> {
        &self.disabled_methods
    }

    pub fn is_disabled(&self, method: WalletMethod) -> bool {
        self.disabled_methods.contains(&method)
    }

    /// Format the total for display (e.g., "$19.99")
    pub fn display_total(&self) -> String {
        self.currency.format_minor(self.amount)
    }
}

impl Default for TransactionRequest {
    /// The storefront demo charge: $19.99, Apple Pay only.
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            currency: Currency::USD,
            amount: 1999,
            label: "Demo total".to_string(),
            payer_name_required: true,
            payer_email_required: true,
            disabled_methods: [WalletMethod::GooglePay, WalletMethod::BrowserCard]
                .into_iter()
                .collect(),
        }
    }
}
