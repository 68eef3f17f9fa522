//! A single payment attempt, from the checkout form to the updated order.

use std::str::FromStr;

use common_utils::date_time;
use error_stack::ResultExt;
use gateway_env::logger;

use super::{
    decision::{self, DecisionContext},
    validation,
};
use crate::{
    configs::settings::{GatewayConfig, Settings},
    connector::{cybersource::transformers::CybersourceReply, Cybersource},
    consts,
    errors::{ConfigurationError, CustomResult, GatewayError, TransportError},
    services::{
        order::{CartInterface, OrderInterface},
        soap::{HttpSoapTransport, SoapTransport, WsSecurity},
    },
    types::{
        Decision, Environment, Notice, OrderMetaKey, OrderSnapshot, PaymentForm, PaymentOutcome,
        PaymentResult,
    },
};

/// Gateway configuration together with the transport that signs and posts requests.
#[derive(Debug)]
pub struct Gateway<T> {
    config: GatewayConfig,
    transport: WsSecurity<T>,
    connector: &'static Cybersource,
}

impl<T> Gateway<T>
where
    T: SoapTransport,
{
    /// Requests sent through `transport` are signed with the merchant id and the transaction
    /// key of the configured environment.
    pub fn new(config: GatewayConfig, transport: T) -> Self {
        let transport = WsSecurity::new(
            transport,
            config.merchant_id.clone(),
            config.active_transaction_key().clone(),
        );

        Self {
            config,
            transport,
            connector: Cybersource::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn is_available(&self) -> bool {
        self.config.is_available()
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn description(&self) -> String {
        self.config.checkout_description()
    }
}

impl Gateway<HttpSoapTransport> {
    pub fn from_settings(settings: &Settings) -> CustomResult<Self, ConfigurationError> {
        let transport = HttpSoapTransport::new(&settings.connection)?;
        Ok(Self::new(settings.gateway.clone(), transport))
    }
}

/// Business Center link for the transaction recorded on `order`, if any.
pub fn transaction_url<O>(order: &O) -> Option<String>
where
    O: OrderInterface + ?Sized,
{
    let request_id = order
        .get_meta(OrderMetaKey::TransactionId)
        .filter(|request_id| !request_id.trim().is_empty())?;
    let environment = order
        .get_meta(OrderMetaKey::Environment)
        .and_then(|environment| Environment::from_str(&environment).ok())
        .unwrap_or_default();

    Some(environment.transaction_url(&request_id))
}

fn debug_notice(reply: &CybersourceReply) -> String {
    reply
        .debug_fields()
        .into_iter()
        .fold(consts::DEBUG_RESPONSE_HEADING.to_string(), |notice, (name, value)| {
            format!("{notice}\n{name} => {value}")
        })
}

fn connection_error_notice(error: &TransportError) -> Notice {
    Notice::error(format!("Connection error: \"{}\"", error.user_message()))
}

/// Run one payment attempt for `order`.
///
/// Declines, invalid card data and connection problems are reported through the returned
/// [`PaymentOutcome`]; `Err` is reserved for requests that could not be built or signed.
pub async fn process_payment<T, O, C>(
    gateway: &Gateway<T>,
    order: &mut O,
    snapshot: &OrderSnapshot,
    cart: &mut C,
    form: &PaymentForm,
) -> CustomResult<PaymentOutcome, GatewayError>
where
    T: SoapTransport,
    O: OrderInterface + ?Sized,
    C: CartInterface + ?Sized,
{
    let config = &gateway.config;
    let connector = gateway.connector;
    let mut notices = Vec::new();

    let card = match validation::validate_fields(config, form) {
        Ok(card) => card,
        Err(error) => {
            logger::info!(
                order = snapshot.merchant_reference_code(),
                reason = %error.current_context(),
                "card details failed validation"
            );
            notices.push(Notice::error(error.current_context().to_string()));
            return Ok(PaymentOutcome {
                result: PaymentResult::Failure,
                notices,
            });
        }
    };

    let request = connector.get_request_body(config, snapshot, &card)?;
    if config.log_enabled() {
        logger::info!(
            connector = connector.id(),
            account_number = %card.card_number.get_masked_for_log(),
            request = ?request,
            "sending payment request"
        );
    }
    let soap_request = connector.build_request(config, &request)?;

    let reply = gateway
        .transport
        .send(soap_request)
        .await
        .and_then(|response| connector.handle_response(response));

    let reply = match reply {
        Ok(reply) => reply,
        Err(error) => match error.current_context() {
            TransportError::MalformedSecurityHeader => {
                return Err(error.change_context(GatewayError::SecurityHeaderInjectionFailed))
            }
            TransportError::MalformedEnvelope => {
                return Err(error.change_context(GatewayError::RequestEncodingFailed))
            }
            context => {
                logger::warn!(
                    connector = connector.id(),
                    order = request.merchant_reference_code(),
                    error = ?error,
                    "payment request did not return a decision"
                );
                notices.push(connection_error_notice(context));
                return Ok(PaymentOutcome {
                    result: PaymentResult::Failure,
                    notices,
                });
            }
        },
    };

    if config.is_debug_mode() {
        notices.push(Notice::notice(debug_notice(&reply)));
    }
    if config.log_enabled() {
        logger::info!(connector = connector.id(), reply = ?reply, "received payment reply");
    }

    let decision = reply.decision();
    let last4 = card.card_number.get_last4();
    let transaction_date = date_time::format_sql(date_time::now())
        .change_context(GatewayError::TimestampFormattingFailed)?;

    order.update_meta(OrderMetaKey::TransactionId, &reply.request_id);
    order.update_meta(OrderMetaKey::GenericTransactionId, &reply.request_id);
    order.update_meta(OrderMetaKey::Environment, &config.environment.to_string());
    order.update_meta(OrderMetaKey::CardType, card.card_type.metadata_name());
    order.update_meta(OrderMetaKey::AccountFour, &last4);
    order.update_meta(OrderMetaKey::CardExpiryDate, &card.expiration.to_year_month());
    order.update_meta(OrderMetaKey::TransactionDate, &transaction_date);
    if let Some(authorization_code) = reply.authorization_code() {
        order.update_meta(OrderMetaKey::AuthorizationCode, authorization_code);
    }
    if decision == Decision::Accept {
        let captured = if request.captures() { "yes" } else { "no" };
        order.update_meta(OrderMetaKey::ChargeCaptured, captured);
    }

    let expiration = card.expiration.to_month_year();
    let context = DecisionContext {
        environment: config.environment,
        card_type: card.card_type,
        last4: &last4,
        expiration: &expiration,
    };
    let payment_decision = decision::decide(decision, reply.reason_code, &context);
    let applied = decision::apply(&payment_decision, order, &reply.request_id);

    logger::info!(
        connector = connector.id(),
        order = request.merchant_reference_code(),
        request_id = %reply.request_id,
        %decision,
        reason_code = reply.reason_code,
        ?applied,
        "payment decision applied"
    );

    if payment_decision.empty_cart {
        cart.empty_cart();
    }
    if let Some(message) = payment_decision.user_message {
        notices.push(Notice::error(message));
    }

    Ok(PaymentOutcome {
        result: payment_decision.result,
        notices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_db::MockOrder;

    #[test]
    fn transaction_url_uses_recorded_environment() {
        let mut order = MockOrder::default();
        assert_eq!(transaction_url(&order), None);

        order.update_meta(OrderMetaKey::TransactionId, "4242");
        order.update_meta(OrderMetaKey::Environment, "test");
        assert_eq!(
            transaction_url(&order).as_deref(),
            Some("https://ebctest.cybersource.com/ebctest/transactionsearch/TransactionSearchDetailsLoad.do?requestId=4242")
        );

        order.update_meta(OrderMetaKey::Environment, "production");
        assert_eq!(
            transaction_url(&order).as_deref(),
            Some("https://ebc.cybersource.com/ebc/transactionsearch/TransactionSearchDetailsLoad.do?requestId=4242")
        );
    }

    #[test]
    fn connection_notice_quotes_the_message() {
        let notice = connection_error_notice(&TransportError::ConnectionFailed {
            message: "timed out".to_string(),
        });
        assert_eq!(notice, Notice::error("Connection error: \"timed out\""));
    }
}
