use std::str::FromStr;

use common_utils::types::{Currency, StringMajorUnit};
use error_stack::ResultExt;
use masking::{PeekInterface, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    configs::settings::GatewayConfig,
    consts,
    core::validation::ValidatedCard,
    errors::GatewayError,
    types::{BillingAddress, Decision, LineItem, OrderSnapshot},
};

type Error = error_stack::Report<GatewayError>;

#[derive(Debug)]
pub struct CybersourceRouterData<'a> {
    pub config: &'a GatewayConfig,
    pub order: &'a OrderSnapshot,
    pub card: &'a ValidatedCard,
}

impl<'a> From<(&'a GatewayConfig, &'a OrderSnapshot, &'a ValidatedCard)>
    for CybersourceRouterData<'a>
{
    fn from(
        (config, order, card): (&'a GatewayConfig, &'a OrderSnapshot, &'a ValidatedCard),
    ) -> Self {
        Self {
            config,
            order,
            card,
        }
    }
}

/// `requestMessage` of the transaction-data schema. Fields are declared in schema order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourcePaymentsRequest {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "merchantID")]
    merchant_id: String,
    merchant_reference_code: String,
    client_library: &'static str,
    client_library_version: &'static str,
    client_environment: String,
    bill_to: BillTo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    item: Vec<Item>,
    purchase_totals: PurchaseTotals,
    card: Card,
    cc_auth_service: ServiceRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc_capture_service: Option<ServiceRun>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTo {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    street1: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    street2: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<Secret<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip_address: Option<Secret<String>>,
    #[serde(rename = "customerID", skip_serializing_if = "Option::is_none")]
    customer_id: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "@id")]
    id: usize,
    unit_price: StringMajorUnit,
    quantity: u32,
    product_name: String,
    #[serde(rename = "productSKU", skip_serializing_if = "Option::is_none")]
    product_sku: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTotals {
    currency: String,
    grand_total_amount: StringMajorUnit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    account_number: Secret<String>,
    expiration_month: String,
    expiration_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cv_number: Option<Secret<String>>,
    card_type: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceRun {
    #[serde(rename = "@run")]
    run: &'static str,
}

impl ServiceRun {
    fn enabled() -> Self {
        Self { run: "true" }
    }
}

fn non_empty<T: AsRef<str>>(value: &Option<T>) -> bool {
    value
        .as_ref()
        .is_some_and(|value| !value.as_ref().trim().is_empty())
}

fn non_empty_secret(value: &Option<Secret<String>>) -> Option<Secret<String>> {
    value
        .as_ref()
        .filter(|secret| !secret.peek().trim().is_empty())
        .cloned()
}

impl From<(&BillingAddress, &OrderSnapshot)> for BillTo {
    fn from((billing, order): (&BillingAddress, &OrderSnapshot)) -> Self {
        let plain = |value: &Option<String>| non_empty(value).then(|| value.clone()).flatten();

        Self {
            first_name: non_empty_secret(&billing.first_name),
            last_name: non_empty_secret(&billing.last_name),
            street1: non_empty_secret(&billing.street1),
            street2: non_empty_secret(&billing.street2),
            city: plain(&billing.city),
            state: plain(&billing.state),
            postal_code: non_empty_secret(&billing.postal_code),
            country: plain(&billing.country),
            company: plain(&billing.company),
            phone_number: non_empty_secret(&billing.phone_number),
            email: non_empty_secret(&billing.email),
            ip_address: non_empty_secret(&order.customer_ip_address),
            // guests have no store account
            customer_id: order.customer_id.filter(|id| *id != 0),
        }
    }
}

impl From<(usize, &LineItem, &Currency)> for Item {
    fn from((id, line_item, currency): (usize, &LineItem, &Currency)) -> Self {
        Self {
            id,
            unit_price: line_item.unit_price.to_major_unit_as_string(currency),
            quantity: line_item.quantity,
            product_name: line_item.name.clone(),
            product_sku: non_empty(&line_item.sku)
                .then(|| line_item.sku.clone())
                .flatten(),
        }
    }
}

fn client_environment() -> String {
    format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

impl TryFrom<&CybersourceRouterData<'_>> for CybersourcePaymentsRequest {
    type Error = Error;

    fn try_from(item: &CybersourceRouterData<'_>) -> Result<Self, Self::Error> {
        let CybersourceRouterData {
            config,
            order,
            card,
        } = item;

        let currency = Currency::from_str(&order.currency)
            .change_context(GatewayError::RequestEncodingFailed)?;

        Ok(Self {
            xmlns: consts::TRANSACTION_DATA_NAMESPACE,
            merchant_id: config.merchant_id.clone(),
            merchant_reference_code: order.merchant_reference_code().to_string(),
            client_library: consts::CLIENT_LIBRARY,
            client_library_version: consts::CLIENT_LIBRARY_VERSION,
            client_environment: client_environment(),
            bill_to: BillTo::from((&order.billing, *order)),
            item: order
                .items
                .iter()
                .enumerate()
                .map(|(id, line_item)| Item::from((id, line_item, &currency)))
                .collect(),
            purchase_totals: PurchaseTotals {
                grand_total_amount: order.total.to_major_unit_as_string(&currency),
                currency: currency.to_string(),
            },
            card: Card {
                account_number: Secret::new(card.card_number.get_card_no()),
                expiration_month: card.expiration.get_month().two_digits(),
                expiration_year: card.expiration.get_year().four_digits(),
                cv_number: card
                    .security_code
                    .as_ref()
                    .map(|code| Secret::new(code.peek().peek().clone())),
                card_type: card.card_type.code().to_string(),
            },
            cc_auth_service: ServiceRun::enabled(),
            cc_capture_service: config.perform_charge().then(ServiceRun::enabled),
        })
    }
}

impl CybersourcePaymentsRequest {
    pub fn merchant_reference_code(&self) -> &str {
        &self.merchant_reference_code
    }

    pub fn captures(&self) -> bool {
        self.cc_capture_service.is_some()
    }
}

/// SOAP reply envelope. Element prefixes are ignored when matching names.
#[derive(Debug, Deserialize)]
#[serde(rename = "Envelope")]
pub struct CybersourceEnvelope {
    #[serde(rename = "Body")]
    pub body: CybersourceBody,
}

#[derive(Debug, Deserialize)]
pub struct CybersourceBody {
    #[serde(rename = "replyMessage")]
    pub reply_message: Option<CybersourceReply>,
    #[serde(rename = "Fault")]
    pub fault: Option<SoapFault>,
}

#[derive(Debug, Deserialize)]
pub struct SoapFault {
    #[serde(rename = "faultcode")]
    pub fault_code: String,
    #[serde(rename = "faultstring")]
    pub fault_string: String,
}

/// `replyMessage` of the transaction-data schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourceReply {
    pub merchant_reference_code: Option<String>,
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub decision: String,
    pub reason_code: i64,
    pub request_token: Option<String>,
    pub cc_auth_reply: Option<CcAuthReply>,
    pub cc_capture_reply: Option<CcCaptureReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcAuthReply {
    pub reason_code: Option<i64>,
    pub amount: Option<String>,
    pub authorization_code: Option<String>,
    pub avs_code: Option<String>,
    pub cv_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcCaptureReply {
    pub reason_code: Option<i64>,
    pub amount: Option<String>,
    pub reconciliation_id: Option<String>,
}

impl CybersourceReply {
    pub fn decision(&self) -> Decision {
        Decision::from_reply(&self.decision)
    }

    pub fn authorization_code(&self) -> Option<&str> {
        self.cc_auth_reply
            .as_ref()
            .and_then(|reply| reply.authorization_code.as_deref())
            .filter(|code| !code.trim().is_empty())
    }

    /// Reply fields as `name => value` pairs, for the debug notice and the log.
    pub fn debug_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(reference) = &self.merchant_reference_code {
            fields.push(("merchantReferenceCode", reference.clone()));
        }
        fields.push(("requestID", self.request_id.clone()));
        fields.push(("decision", self.decision.clone()));
        fields.push(("reasonCode", self.reason_code.to_string()));
        if let Some(token) = &self.request_token {
            fields.push(("requestToken", token.clone()));
        }
        if let Some(auth) = &self.cc_auth_reply {
            fields.push(("ccAuthReply", format!("{auth:?}")));
        }
        if let Some(capture) = &self.cc_capture_reply {
            fields.push(("ccCaptureReply", format!("{capture:?}")));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::str::FromStr;

    use cards::{CardExpiration, CardNumber, CardSecurityCode};
    use common_utils::{ext_traits::ByteSliceExt, ext_traits::XmlEncode, types::MinorUnit};

    use super::*;
    use crate::types::{CardType, TransactionType};

    fn order() -> OrderSnapshot {
        OrderSnapshot {
            order_number: "#1042".into(),
            customer_id: Some(7),
            billing: BillingAddress {
                first_name: Some(Secret::new("Ada".into())),
                last_name: Some(Secret::new("Lovelace".into())),
                company: Some(String::new()),
                street1: Some(Secret::new("1 Main St".into())),
                street2: None,
                city: Some("Springfield".into()),
                state: Some("IL".into()),
                postal_code: Some(Secret::new("62701".into())),
                country: Some("US".into()),
                phone_number: Some(Secret::new("555-0100".into())),
                email: Some(Secret::new("ada@example.com".into())),
            },
            customer_ip_address: Some(Secret::new("203.0.113.9".into())),
            currency: "usd".into(),
            total: MinorUnit::new(2500),
            items: vec![
                LineItem {
                    name: "Widget".into(),
                    sku: Some("W-1".into()),
                    unit_price: MinorUnit::new(1000),
                    quantity: 2,
                },
                LineItem {
                    name: "Shipping & handling".into(),
                    sku: None,
                    unit_price: MinorUnit::new(500),
                    quantity: 1,
                },
            ],
        }
    }

    fn card() -> ValidatedCard {
        ValidatedCard {
            card_type: CardType::Visa,
            card_number: CardNumber::from_str("4111111111111111").unwrap(),
            expiration: CardExpiration::new_relative_to("3", "2030", 2026).unwrap(),
            security_code: Some(CardSecurityCode::new("123", CardType::Visa.into()).unwrap()),
        }
    }

    fn request(config: &GatewayConfig, order: &OrderSnapshot) -> CybersourcePaymentsRequest {
        let card = card();
        CybersourcePaymentsRequest::try_from(&CybersourceRouterData::from((config, order, &card)))
            .unwrap()
    }

    fn config() -> GatewayConfig {
        GatewayConfig {
            merchant_id: "acme".into(),
            ..Default::default()
        }
    }

    #[test]
    fn charge_serializes_in_schema_order() {
        let xml = request(&config(), &order())
            .encode_to_xml_string("requestMessage")
            .unwrap();

        assert!(xml.starts_with(
            r#"<requestMessage xmlns="urn:schemas-cybersource-com:transaction-data-1.26"><merchantID>acme</merchantID><merchantReferenceCode>1042</merchantReferenceCode><clientLibrary>Rust</clientLibrary>"#
        ));
        assert!(xml.contains(
            "<billTo><firstName>Ada</firstName><lastName>Lovelace</lastName><street1>1 Main St</street1><city>Springfield</city><state>IL</state><postalCode>62701</postalCode><country>US</country><phoneNumber>555-0100</phoneNumber><email>ada@example.com</email><ipAddress>203.0.113.9</ipAddress><customerID>7</customerID></billTo>"
        ));
        assert!(xml.contains(
            r#"<item id="0"><unitPrice>10.00</unitPrice><quantity>2</quantity><productName>Widget</productName><productSKU>W-1</productSKU></item><item id="1"><unitPrice>5.00</unitPrice><quantity>1</quantity><productName>Shipping &amp; handling</productName></item>"#
        ));
        assert!(xml.contains(
            "<purchaseTotals><currency>USD</currency><grandTotalAmount>25.00</grandTotalAmount></purchaseTotals>"
        ));
        assert!(xml.ends_with(
            r#"<card><accountNumber>4111111111111111</accountNumber><expirationMonth>03</expirationMonth><expirationYear>2030</expirationYear><cvNumber>123</cvNumber><cardType>001</cardType></card><ccAuthService run="true"/><ccCaptureService run="true"/></requestMessage>"#
        ));
    }

    #[test]
    fn authorization_only_skips_capture() {
        let config = GatewayConfig {
            transaction_type: TransactionType::Authorization,
            ..config()
        };
        let request = request(&config, &order());
        assert!(!request.captures());

        let xml = request.encode_to_xml_string("requestMessage").unwrap();
        assert!(xml.contains(r#"<ccAuthService run="true"/>"#));
        assert!(!xml.contains("ccCaptureService"));
    }

    #[test]
    fn guests_and_empty_carts_omit_optional_elements() {
        let mut order = order();
        order.customer_id = Some(0);
        order.items.clear();

        let xml = request(&config(), &order)
            .encode_to_xml_string("requestMessage")
            .unwrap();
        assert!(!xml.contains("customerID"));
        assert!(!xml.contains("<item"));
        assert!(!xml.contains("<company"));
    }

    #[test]
    fn amounts_follow_the_currency_exponent() {
        let mut order = order();
        order.currency = "jpy".into();
        order.total = MinorUnit::new(500);
        order.items.truncate(1);

        let xml = request(&config(), &order)
            .encode_to_xml_string("requestMessage")
            .unwrap();
        assert!(xml.contains(
            "<purchaseTotals><currency>JPY</currency><grandTotalAmount>500.00</grandTotalAmount></purchaseTotals>"
        ));
        assert!(xml.contains("<unitPrice>1000.00</unitPrice>"));
    }

    #[test]
    fn invalid_currency_is_an_encoding_failure() {
        let mut order = order();
        order.currency = "dollars".into();
        let card = card();
        let config = config();

        let error =
            CybersourcePaymentsRequest::try_from(&CybersourceRouterData::from((&config, &order, &card)))
                .unwrap_err();
        assert!(matches!(
            error.current_context(),
            GatewayError::RequestEncodingFailed
        ));
    }

    #[test]
    fn card_data_is_masked_in_debug_output() {
        let debug = format!("{:?}", request(&config(), &order()));
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("ada@example.com"));
    }

    #[test]
    fn parses_reply_envelope() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header/>
  <soap:Body>
    <c:replyMessage xmlns:c="urn:schemas-cybersource-com:transaction-data-1.26">
      <c:merchantReferenceCode>1042</c:merchantReferenceCode>
      <c:requestID>6543210987654321098765</c:requestID>
      <c:decision>ACCEPT</c:decision>
      <c:reasonCode>100</c:reasonCode>
      <c:requestToken>Ahj/7wSTAbc</c:requestToken>
      <c:purchaseTotals><c:currency>USD</c:currency></c:purchaseTotals>
      <c:ccAuthReply>
        <c:reasonCode>100</c:reasonCode>
        <c:amount>25.00</c:amount>
        <c:authorizationCode>831000</c:authorizationCode>
        <c:avsCode>Y</c:avsCode>
      </c:ccAuthReply>
    </c:replyMessage>
  </soap:Body>
</soap:Envelope>"#;

        let envelope: CybersourceEnvelope =
            body.as_bytes().parse_xml("CybersourceEnvelope").unwrap();
        let reply = envelope.body.reply_message.unwrap();

        assert_eq!(reply.request_id, "6543210987654321098765");
        assert_eq!(reply.decision(), Decision::Accept);
        assert_eq!(reply.reason_code, 100);
        assert_eq!(reply.authorization_code(), Some("831000"));
        assert!(envelope.body.fault.is_none());
        assert_eq!(
            reply.debug_fields().first(),
            Some(&("merchantReferenceCode", "1042".to_string()))
        );
    }

    #[test]
    fn parses_fault_envelope() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd"><faultcode>wsse:FailedCheck</faultcode><faultstring>Security Data : UsernameToken authentication failed.</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;

        let envelope: CybersourceEnvelope =
            body.as_bytes().parse_xml("CybersourceEnvelope").unwrap();
        let fault = envelope.body.fault.unwrap();

        assert!(envelope.body.reply_message.is_none());
        assert_eq!(fault.fault_code, "wsse:FailedCheck");
        assert_eq!(
            fault.fault_string,
            "Security Data : UsernameToken authentication failed."
        );
    }
}
