use std::str::FromStr;

use cards::{CardExpiration, CardNetwork, CardNumber, CardSecurityCode};
use error_stack::{report, Report, ResultExt};
use masking::PeekInterface;

use crate::{
    configs::settings::GatewayConfig,
    errors::{CardValidationError, CustomResult},
    types::{CardType, PaymentForm},
};

/// Card details that passed checkout validation.
#[derive(Clone, Debug)]
pub struct ValidatedCard {
    pub card_type: CardType,
    pub card_number: CardNumber,
    pub expiration: CardExpiration,
    /// Absent when the security code is optional and was left blank.
    pub security_code: Option<CardSecurityCode>,
}

fn trimmed(value: Option<&str>) -> &str {
    value.map(str::trim).unwrap_or_default()
}

fn card_data_error(report: Report<cards::CardDataError>) -> Report<CardValidationError> {
    let context = CardValidationError::from(*report.current_context());
    report.change_context(context)
}

/// Validate the checkout form, stopping at the first invalid field.
pub fn validate_fields(
    config: &GatewayConfig,
    form: &PaymentForm,
) -> CustomResult<ValidatedCard, CardValidationError> {
    let current_year = cards::current_year().map_err(card_data_error)?;
    validate_fields_relative_to(config, form, current_year)
}

/// [`validate_fields`] against a fixed calendar year.
pub fn validate_fields_relative_to(
    config: &GatewayConfig,
    form: &PaymentForm,
    current_year: u16,
) -> CustomResult<ValidatedCard, CardValidationError> {
    let card_type = trimmed(form.card_type.as_deref());
    if card_type.is_empty() {
        return Err(report!(CardValidationError::MissingCardType));
    }

    let card_type = CardType::from_str(card_type)
        .change_context(CardValidationError::CardTypeNotAccepted)
        .attach_printable_lazy(|| format!("unknown card type code {card_type}"))?;
    if !config.accepts(card_type) {
        return Err(report!(CardValidationError::CardTypeNotAccepted))
            .attach_printable_lazy(|| format!("{card_type} is not among the accepted card types"));
    }
    let network = CardNetwork::from(card_type);

    let cv_number = trimmed(form.cv_number.as_ref().map(|code| code.peek().as_str()));
    let security_code = if config.is_csc_required() {
        Some(CardSecurityCode::new(cv_number, network).map_err(card_data_error)?)
    } else {
        // optional codes are forwarded only when they are well formed
        CardSecurityCode::new(cv_number, network).ok()
    };

    let expiration = CardExpiration::new_relative_to(
        trimmed(form.expiration_month.as_deref()),
        trimmed(form.expiration_year.as_deref()),
        current_year,
    )
    .map_err(card_data_error)?;

    let account_number = trimmed(form.account_number.as_ref().map(|number| number.peek().as_str()));
    let card_number = CardNumber::from_str(account_number)
        .change_context(CardValidationError::InvalidCardNumber)?;

    Ok(ValidatedCard {
        card_type,
        card_number,
        expiration,
        security_code,
    })
}
