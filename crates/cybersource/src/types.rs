pub mod enums;

use common_utils::types::MinorUnit;
use masking::Secret;
use serde::{Deserialize, Serialize};

pub use self::enums::{
    CardType, Decision, DebugMode, Environment, NoticeLevel, OrderMetaKey, OrderStatus,
    PaymentResult, TransactionType,
};

/// Card fields as posted by the checkout form.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaymentForm {
    pub card_type: Option<String>,
    pub account_number: Option<Secret<String>>,
    pub expiration_month: Option<String>,
    pub expiration_year: Option<String>,
    pub cv_number: Option<Secret<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BillingAddress {
    pub first_name: Option<Secret<String>>,
    pub last_name: Option<Secret<String>>,
    pub company: Option<String>,
    pub street1: Option<Secret<String>>,
    pub street2: Option<Secret<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<Secret<String>>,
    pub country: Option<String>,
    pub phone_number: Option<Secret<String>>,
    pub email: Option<Secret<String>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: MinorUnit,
    pub quantity: u32,
}

/// The parts of the order a payment request is built from.
#[derive(Clone, Debug, Deserialize)]
pub struct OrderSnapshot {
    /// Order number as displayed, possibly with a leading `#`.
    pub order_number: String,
    /// Store user id; guests have none.
    pub customer_id: Option<u64>,
    pub billing: BillingAddress,
    pub customer_ip_address: Option<Secret<String>>,
    pub currency: String,
    pub total: MinorUnit,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl OrderSnapshot {
    /// Order number without the leading `#`.
    pub fn merchant_reference_code(&self) -> &str {
        self.order_number
            .strip_prefix('#')
            .unwrap_or(&self.order_number)
    }
}

/// Message surfaced on the checkout page.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Notice,
            message: message.into(),
        }
    }
}

/// What the checkout does next: redirect to the thank-you page on success, stay otherwise.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub result: PaymentResult,
    pub notices: Vec<Notice>,
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        self.result == PaymentResult::Success
    }
}
