mod validate;

use common_utils::{date_time, errors::CustomResult};
use error_stack::report;
use masking::{PeekInterface, StrongSecret};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use crate::validate::{
    mask_account_number, CCValError, CardNumber, CardNumberStrategy, MAX_CARD_NUMBER_LENGTH,
    MIN_CARD_NUMBER_LENGTH,
};

/// How many years ahead of the current one an expiry may lie.
pub const MAX_EXPIRY_YEARS_AHEAD: u16 = 20;

/// Reasons a card field fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardDataError {
    #[error("card security code is missing")]
    MissingSecurityCode,
    #[error("card security code must only contain digits")]
    NonNumericSecurityCode,
    #[error("card security code must be {expected} digits long")]
    SecurityCodeLength { expected: usize },
    #[error("invalid card expiration month")]
    InvalidExpirationMonth,
    #[error("invalid card expiration year")]
    InvalidExpirationYear,
}

/// Card networks the checkout form can offer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
}

impl CardNetwork {
    /// Number of digits printed in the card security code.
    pub fn security_code_length(&self) -> usize {
        match self {
            Self::AmericanExpress => 4,
            Self::Visa | Self::Mastercard | Self::Discover => 3,
        }
    }
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

/// Security code kept as a string so that leading zeros survive.
#[derive(Clone, Debug)]
pub struct CardSecurityCode(StrongSecret<String>);

impl CardSecurityCode {
    pub fn new(raw: &str, network: CardNetwork) -> CustomResult<Self, CardDataError> {
        if raw.is_empty() {
            return Err(report!(CardDataError::MissingSecurityCode));
        }

        if !is_all_digits(raw) {
            return Err(report!(CardDataError::NonNumericSecurityCode));
        }

        let expected = network.security_code_length();
        if raw.len() != expected {
            return Err(report!(CardDataError::SecurityCodeLength { expected }));
        }

        Ok(Self(StrongSecret::new(raw.to_string())))
    }
}

#[derive(Clone, Debug)]
pub struct CardExpirationMonth(StrongSecret<u8>);

impl CardExpirationMonth {
    pub fn new(raw: &str) -> CustomResult<Self, CardDataError> {
        let month = is_all_digits(raw)
            .then(|| raw.parse::<u8>().ok())
            .flatten()
            .filter(|month| (1..=12).contains(month))
            .ok_or_else(|| report!(CardDataError::InvalidExpirationMonth))?;

        Ok(Self(StrongSecret::new(month)))
    }

    pub fn two_digits(&self) -> String {
        format!("{:02}", self.0.peek())
    }
}

/// The current calendar year, as expiry years are compared against it.
pub fn current_year() -> CustomResult<u16, CardDataError> {
    u16::try_from(date_time::current_year())
        .map_err(|_| report!(CardDataError::InvalidExpirationYear))
}

#[derive(Clone, Debug)]
pub struct CardExpirationYear(StrongSecret<u16>);

impl CardExpirationYear {
    /// Accepts years from `current_year` up to `current_year + 20`, both inclusive.
    pub fn new_relative_to(raw: &str, current_year: u16) -> CustomResult<Self, CardDataError> {
        let last_accepted = current_year.saturating_add(MAX_EXPIRY_YEARS_AHEAD);
        let year = is_all_digits(raw)
            .then(|| raw.parse::<u16>().ok())
            .flatten()
            .filter(|year| (current_year..=last_accepted).contains(year))
            .ok_or_else(|| report!(CardDataError::InvalidExpirationYear))?;

        Ok(Self(StrongSecret::new(year)))
    }

    pub fn four_digits(&self) -> String {
        format!("{:04}", self.0.peek())
    }
}

/// Expiry as typed at checkout.
///
/// Only the year is bounded against the calendar: a month that already passed in the
/// current year is accepted and left for the processor to judge.
#[derive(Clone, Debug)]
pub struct CardExpiration {
    pub month: CardExpirationMonth,
    pub year: CardExpirationYear,
}

impl CardExpiration {
    pub fn new(month: &str, year: &str) -> CustomResult<Self, CardDataError> {
        Self::new_relative_to(month, year, current_year()?)
    }

    pub fn new_relative_to(
        month: &str,
        year: &str,
        current_year: u16,
    ) -> CustomResult<Self, CardDataError> {
        Ok(Self {
            month: CardExpirationMonth::new(month)?,
            year: CardExpirationYear::new_relative_to(year, current_year)?,
        })
    }

    pub fn get_month(&self) -> &CardExpirationMonth {
        &self.month
    }

    pub fn get_year(&self) -> &CardExpirationYear {
        &self.year
    }

    /// `YYYY-MM`
    pub fn to_year_month(&self) -> String {
        format!("{}-{}", self.year.four_digits(), self.month.two_digits())
    }

    /// `MM/YYYY`
    pub fn to_month_year(&self) -> String {
        format!("{}/{}", self.month.two_digits(), self.year.four_digits())
    }
}

impl PeekInterface<StrongSecret<String>> for CardSecurityCode {
    fn peek(&self) -> &StrongSecret<String> {
        &self.0
    }
}

impl PeekInterface<StrongSecret<u8>> for CardExpirationMonth {
    fn peek(&self) -> &StrongSecret<u8> {
        &self.0
    }
}

impl PeekInterface<StrongSecret<u16>> for CardExpirationYear {
    fn peek(&self) -> &StrongSecret<u16> {
        &self.0
    }
}
