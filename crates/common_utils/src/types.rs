//! Types that can be used in other crates

use std::{fmt::Display, str::FromStr};

use error_stack::report;
use serde::{Deserialize, Serialize};

use crate::{consts::MIN_MAJOR_UNIT_DECIMALS, errors::ParsingError};

/// Three-letter ISO 4217 currency code, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    /// The upper-cased code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Currencies without a minor unit.
    pub fn is_zero_decimal_currency(&self) -> bool {
        matches!(
            self.as_str(),
            "BIF"
                | "CLP"
                | "DJF"
                | "GNF"
                | "JPY"
                | "KMF"
                | "KRW"
                | "MGA"
                | "PYG"
                | "RWF"
                | "UGX"
                | "VND"
                | "VUV"
                | "XAF"
                | "XOF"
                | "XPF"
        )
    }

    /// Currencies whose minor unit is a thousandth.
    pub fn is_three_decimal_currency(&self) -> bool {
        matches!(self.as_str(), "BHD" | "JOD" | "KWD" | "OMR" | "TND")
    }

    /// Currencies whose minor unit is a ten-thousandth.
    pub fn is_four_decimal_currency(&self) -> bool {
        self.as_str() == "CLF"
    }

    /// Exponent of the minor unit.
    pub fn number_of_digits_after_decimal_point(&self) -> u8 {
        if self.is_zero_decimal_currency() {
            0
        } else if self.is_three_decimal_currency() {
            3
        } else if self.is_four_decimal_currency() {
            4
        } else {
            2
        }
    }
}

impl FromStr for Currency {
    type Err = error_stack::Report<ParsingError>;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim();
        if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_alphabetic()) {
            return Err(report!(ParsingError::CurrencyCodeParseFailure)
                .attach_printable(format!("{code:?} is not a currency code")));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amount expressed in the minor unit of its currency (cents for USD, yen for JPY).
#[derive(
    Default, Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct MinorUnit(i64);

impl MinorUnit {
    /// forms a new minor unit from amount
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Convert the amount to its major denomination based on `currency`.
    ///
    /// Integer arithmetic only. At least two decimals are rendered, so `1999` in USD is
    /// `19.99`, `500` in JPY is `500.00` and `1234` in KWD is `1.234`.
    pub fn to_major_unit_as_string(&self, currency: &Currency) -> StringMajorUnit {
        let decimals = currency.number_of_digits_after_decimal_point();
        let sign = if self.0 < 0 { "-" } else { "" };
        let absolute = self.0.unsigned_abs();
        let per_major = 10u64.pow(u32::from(decimals));

        let fraction = if decimals == 0 {
            String::new()
        } else {
            format!(
                "{:0width$}",
                absolute % per_major,
                width = usize::from(decimals)
            )
        };

        StringMajorUnit::new(format!(
            "{sign}{}.{fraction:0<width$}",
            absolute / per_major,
            width = MIN_MAJOR_UNIT_DECIMALS.max(usize::from(decimals))
        ))
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount in its major denomination, rendered as a fixed-point string.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    /// forms a new major unit from amount
    pub fn new(value: String) -> Self {
        Self(value)
    }
}

impl Display for StringMajorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn major(amount: i64, currency: &str) -> String {
        MinorUnit::new(amount)
            .to_major_unit_as_string(&Currency::from_str(currency).unwrap())
            .to_string()
    }

    #[test]
    fn two_decimal_currencies_divide_by_a_hundred() {
        assert_eq!(major(1999, "USD"), "19.99");
        assert_eq!(major(2000, "EUR"), "20.00");
        assert_eq!(major(5, "GBP"), "0.05");
        assert_eq!(major(0, "USD"), "0.00");
    }

    #[test]
    fn zero_decimal_currencies_keep_the_amount() {
        assert_eq!(major(500, "JPY"), "500.00");
        assert_eq!(major(500, "jpy"), "500.00");
        assert_eq!(major(12345, "KRW"), "12345.00");
    }

    #[test]
    fn three_and_four_decimal_currencies_keep_their_precision() {
        assert_eq!(major(1234, "KWD"), "1.234");
        assert_eq!(major(5, "BHD"), "0.005");
        assert_eq!(major(12345, "CLF"), "1.2345");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(major(-150, "USD"), "-1.50");
        assert_eq!(major(-7, "JPY"), "-7.00");
    }

    #[test]
    fn currency_codes_are_validated() {
        assert_eq!(Currency::from_str(" usd ").unwrap().as_str(), "USD");
        for code in ["", "US", "USDX", "U$D", "dollars"] {
            assert!(Currency::from_str(code).is_err(), "{code:?}");
        }
    }
}
