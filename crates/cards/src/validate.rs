use std::{fmt, ops::Deref, str::FromStr};

use gateway_env::logger;
use masking::{PeekInterface, Strategy, StrongSecret, WithType};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Shortest primary account number accepted at checkout.
pub const MIN_CARD_NUMBER_LENGTH: usize = 12;
/// Longest primary account number accepted at checkout.
pub const MAX_CARD_NUMBER_LENGTH: usize = 19;

#[derive(Debug, Deserialize, Serialize, Error)]
#[error("not a valid credit card number")]
pub struct CCValError;

impl From<core::convert::Infallible> for CCValError {
    fn from(_: core::convert::Infallible) -> Self {
        Self
    }
}

/// Card number
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CardNumber(StrongSecret<String, CardNumberStrategy>);

impl CardNumber {
    /// Retrieves the card number as a String.
    pub fn get_card_no(&self) -> String {
        self.0.peek().clone()
    }

    /// The last four digits, as stored on orders and shown in order notes.
    pub fn get_last4(&self) -> String {
        let digits = self.0.peek();
        digits
            .get(digits.len().saturating_sub(4)..)
            .unwrap_or_default()
            .to_string()
    }

    /// First digit, asterisks, last four. Used when request payloads are logged.
    pub fn get_masked_for_log(&self) -> String {
        mask_account_number(self.0.peek())
    }
}

/// Mask all but the first and the last four digits of an account number.
pub fn mask_account_number(account_number: &str) -> String {
    let length = account_number.len();
    if length <= 5 {
        return "*".repeat(length);
    }
    match (account_number.get(..1), account_number.get(length - 4..)) {
        (Some(first), Some(last4)) => format!("{first}{}{last4}", "*".repeat(length - 5)),
        _ => "*".repeat(length),
    }
}

/// Strip the separators customers commonly type between digit groups.
fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect()
}

impl FromStr for CardNumber {
    type Err = CCValError;

    /// Accepts 12 to 19 digits, optionally grouped with spaces or dashes, passing the Luhn check.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = normalize(s);

        let well_formed = !digits.is_empty()
            && digits.bytes().all(|byte| byte.is_ascii_digit())
            && (MIN_CARD_NUMBER_LENGTH..=MAX_CARD_NUMBER_LENGTH).contains(&digits.len());

        match well_formed && luhn::valid(&digits) {
            true => Ok(Self(StrongSecret::from_str(&digits)?)),
            false => Err(CCValError),
        }
    }
}

impl TryFrom<String> for CardNumber {
    type Error = CCValError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl Deref for CardNumber {
    type Target = StrongSecret<String, CardNumberStrategy>;

    fn deref(&self) -> &StrongSecret<String, CardNumberStrategy> {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CardNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub enum CardNumberStrategy {}

impl<T> Strategy<T> for CardNumberStrategy
where
    T: AsRef<str>,
{
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let val_str: &str = val.as_ref();

        if val_str.len() < 15 || val_str.len() > 19 {
            return WithType::fmt(val, f);
        }

        if let Some(value) = val_str.get(..6) {
            write!(f, "{}{}", value, "*".repeat(val_str.len() - 6))
        } else {
            logger::error!("Card number could not be masked by prefix");
            WithType::fmt(val, f)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use masking::Secret;

    use super::*;

    #[test]
    fn valid_card_number() {
        let s = "4111111111111111";
        assert_eq!(
            CardNumber::from_str(s).unwrap(),
            CardNumber(StrongSecret::from_str(s).unwrap())
        );
    }

    #[test]
    fn invalid_checksum() {
        assert_eq!(
            CardNumber::from_str("4111111111111112")
                .unwrap_err()
                .to_string(),
            "not a valid credit card number".to_string()
        );
    }

    #[test]
    fn separators_are_removed() {
        let card_number = CardNumber::from_str("4111-1111 1111-1111").unwrap();
        assert_eq!(card_number.get_card_no(), "4111111111111111");
    }

    #[test]
    fn length_bounds() {
        // 11 digits with a valid checksum is still too short
        assert!(CardNumber::from_str("00000000000").is_err());
        // 12 zeros pass the checksum and the lower bound
        assert!(CardNumber::from_str("000000000000").is_ok());
        // 19 digits is the upper bound, 20 is rejected
        assert!(CardNumber::from_str("0000000000000000000").is_ok());
        assert!(CardNumber::from_str("00000000000000000000").is_err());
    }

    fn reference_checksum_holds(digits: &[u32]) -> bool {
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(position, &digit)| match (position % 2, digit * 2) {
                (0, _) => digit,
                (_, doubled) if doubled > 9 => doubled - 9,
                (_, doubled) => doubled,
            })
            .sum();
        sum % 10 == 0
    }

    #[test]
    fn exactly_one_check_digit_completes_any_prefix() {
        let mut state = 0x2545_f491_u64;
        for length in MIN_CARD_NUMBER_LENGTH..=MAX_CARD_NUMBER_LENGTH {
            for _ in 0..200 {
                let prefix: Vec<u32> = (1..length)
                    .map(|_| {
                        state = state
                            .wrapping_mul(6_364_136_223_846_793_005)
                            .wrapping_add(1_442_695_040_888_963_407);
                        u32::try_from((state >> 33) % 10).unwrap()
                    })
                    .collect();

                let accepted: Vec<u32> = (0..10)
                    .filter(|&check_digit| {
                        let digits: Vec<u32> =
                            prefix.iter().copied().chain([check_digit]).collect();
                        let number: String = digits
                            .iter()
                            .map(|digit| char::from_digit(*digit, 10).unwrap())
                            .collect();
                        let valid = CardNumber::from_str(&number).is_ok();
                        assert_eq!(valid, reference_checksum_holds(&digits), "{number}");
                        valid
                    })
                    .collect();
                assert_eq!(accepted.len(), 1, "{prefix:?}");
            }
        }
    }

    #[test]
    fn non_digits_are_rejected() {
        assert!(CardNumber::from_str("4111x11111111111").is_err());
        assert!(CardNumber::from_str("").is_err());
        assert!(CardNumber::from_str(" - ").is_err());
    }

    #[test]
    fn last_four_and_log_mask() {
        let card_number = CardNumber::from_str("378282246310005").unwrap();
        assert_eq!(card_number.get_last4(), "0005");
        assert_eq!(card_number.get_masked_for_log(), "3**********0005");
    }

    #[test]
    fn short_values_are_fully_masked() {
        assert_eq!(mask_account_number("1234"), "****");
        assert_eq!(mask_account_number(""), "");
    }

    #[test]
    fn test_valid_card_number_masking() {
        let secret: Secret<String, CardNumberStrategy> =
            Secret::new("1234567890987654".to_string());
        assert_eq!("123456**********", format!("{secret:?}"));
    }

    #[test]
    fn test_invalid_card_number_masking() {
        let secret: Secret<String, CardNumberStrategy> = Secret::new("1234567890".to_string());
        assert_eq!("*** alloc::string::String ***", format!("{secret:?}"));
    }

    #[test]
    fn test_invalid_card_number_deserialization() {
        let card_number = serde_json::from_str::<CardNumber>(r#""1234 5678""#);
        let error_msg = card_number.unwrap_err().to_string();
        assert_eq!(error_msg, "not a valid credit card number".to_string());
    }
}
