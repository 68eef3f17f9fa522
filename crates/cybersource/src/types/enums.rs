use cards::CardNetwork;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::consts;

/// Processor environment the gateway talks to.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Environment {
    Test,
    #[default]
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Endpoint the SOAP envelope is posted to.
    pub fn service_url(&self) -> &'static str {
        match self {
            Self::Test => consts::TEST_SERVICE_URL,
            Self::Production => consts::PRODUCTION_SERVICE_URL,
        }
    }

    /// Business Center transaction search for a request id.
    pub fn transaction_url(&self, request_id: &str) -> String {
        let base = match self {
            Self::Test => consts::TEST_TRANSACTION_URL,
            Self::Production => consts::PRODUCTION_TRANSACTION_URL,
        };
        format!("{base}{request_id}")
    }
}

#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    /// Authorize and capture in the same request.
    #[default]
    Charge,
    /// Authorize only; funds are captured later from the Business Center.
    Authorization,
}

#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DebugMode {
    #[default]
    Off,
    /// Echo the processor reply on the checkout page.
    Checkout,
    /// Write requests and replies to the log.
    Log,
    Both,
}

impl DebugMode {
    pub fn shows_on_checkout(&self) -> bool {
        matches!(self, Self::Checkout | Self::Both)
    }

    pub fn logs(&self) -> bool {
        matches!(self, Self::Log | Self::Both)
    }
}

/// Card brand as CyberSource codes it in `card.cardType`.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum CardType {
    #[serde(rename = "001")]
    #[strum(serialize = "001")]
    Visa,
    #[serde(rename = "002")]
    #[strum(serialize = "002")]
    MasterCard,
    #[serde(rename = "003")]
    #[strum(serialize = "003")]
    Amex,
    #[serde(rename = "004")]
    #[strum(serialize = "004")]
    Discover,
}

impl CardType {
    pub fn code(&self) -> &str {
        self.as_ref()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::MasterCard => "MasterCard",
            Self::Amex => "American Express",
            Self::Discover => "Discover",
        }
    }

    /// Short name stored in the order's card type metadata.
    pub fn metadata_name(&self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::MasterCard => "mc",
            Self::Amex => "amex",
            Self::Discover => "disc",
        }
    }
}

impl From<CardType> for CardNetwork {
    fn from(card_type: CardType) -> Self {
        match card_type {
            CardType::Visa => Self::Visa,
            CardType::MasterCard => Self::Mastercard,
            CardType::Amex => Self::AmericanExpress,
            CardType::Discover => Self::Discover,
        }
    }
}

/// Overall outcome of a CyberSource request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    Review,
    Error,
    Reject,
}

impl Decision {
    /// Read the `decision` field of a reply. Values other than the four documented ones are
    /// declined like `REJECT`.
    pub fn from_reply(value: &str) -> Self {
        match value.trim() {
            "ACCEPT" => Self::Accept,
            "REVIEW" => Self::Review,
            "ERROR" => Self::Error,
            _ => Self::Reject,
        }
    }
}

/// Order statuses the gateway moves an order between.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    OnHold,
    Failed,
}

impl OrderStatus {
    /// Statuses in which the order counts as paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentResult {
    Success,
    Failure,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Notice,
}

/// Keys of the metadata the gateway stores on the order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, AsRefStr, EnumIter)]
pub enum OrderMetaKey {
    #[strum(serialize = "_wc_cybersource_trans_id")]
    TransactionId,
    /// Same value as [`OrderMetaKey::TransactionId`], under the key order screens look up.
    #[strum(serialize = "_transaction_id")]
    GenericTransactionId,
    #[strum(serialize = "_wc_cybersource_environment")]
    Environment,
    #[strum(serialize = "_wc_cybersource_card_type")]
    CardType,
    #[strum(serialize = "_wc_cybersource_account_four")]
    AccountFour,
    #[strum(serialize = "_wc_cybersource_card_expiry_date")]
    CardExpiryDate,
    #[strum(serialize = "_wc_cybersource_trans_date")]
    TransactionDate,
    #[strum(serialize = "_wc_cybersource_authorization_code")]
    AuthorizationCode,
    #[strum(serialize = "_wc_cybersource_charge_captured")]
    ChargeCaptured,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn card_type_codes_parse_both_ways() {
        for card_type in CardType::iter() {
            assert_eq!(CardType::from_str(card_type.code()).unwrap(), card_type);
        }
        assert_eq!(CardType::Amex.code(), "003");
        assert!(CardType::from_str("005").is_err());
        assert!(CardType::from_str("visa").is_err());
    }

    #[test]
    fn card_type_serializes_as_brand_code() {
        assert_eq!(
            serde_json::to_string(&CardType::MasterCard).unwrap(),
            r#""002""#
        );
        let parsed: Vec<CardType> = serde_json::from_str(r#"["001","004"]"#).unwrap();
        assert_eq!(parsed, vec![CardType::Visa, CardType::Discover]);
    }

    #[test]
    fn unknown_decision_is_treated_as_reject() {
        assert_eq!(Decision::from_reply("PENDING"), Decision::Reject);
        assert_eq!(Decision::from_reply(""), Decision::Reject);
        assert_eq!(Decision::from_reply("REVIEW"), Decision::Review);
        for decision in [Decision::Accept, Decision::Review, Decision::Error, Decision::Reject] {
            assert_eq!(Decision::from_reply(&decision.to_string()), decision);
        }
    }

    #[test]
    fn debug_mode_views() {
        assert!(DebugMode::Both.shows_on_checkout() && DebugMode::Both.logs());
        assert!(DebugMode::Checkout.shows_on_checkout() && !DebugMode::Checkout.logs());
        assert!(!DebugMode::Off.shows_on_checkout() && !DebugMode::Off.logs());
    }

    #[test]
    fn transaction_url_follows_environment() {
        assert_eq!(
            Environment::Test.transaction_url("123"),
            "https://ebctest.cybersource.com/ebctest/transactionsearch/TransactionSearchDetailsLoad.do?requestId=123"
        );
        assert!(Environment::Production
            .transaction_url("123")
            .starts_with("https://ebc.cybersource.com/ebc/"));
    }

    #[test]
    fn order_meta_keys() {
        assert_eq!(OrderMetaKey::ChargeCaptured.as_ref(), "_wc_cybersource_charge_captured");
        assert_eq!(OrderMetaKey::iter().count(), 9);
        assert_eq!(OrderStatus::OnHold.to_string(), "on-hold");
    }
}
