//! Currency codes and monetary precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; stored columns carry
//! [`MONEY_SCALE`] fractional digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits persisted for every monetary column.
pub const MONEY_SCALE: u32 = 4;

/// Total number of digits persisted for every monetary column.
pub const MONEY_PRECISION: u32 = 19;

/// Largest amount a monetary column can hold: `999_999_999_999_999.9999`.
pub const MAX_AMOUNT: Decimal =
    Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, MONEY_SCALE);

/// Returns true if `amount` fits the stored precision without rounding.
#[must_use]
pub fn has_valid_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Returns true if `amount` fits a monetary column without overflowing.
#[must_use]
pub fn is_within_limit(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}

/// ISO 4217 style currency code (three ASCII letters, upper-cased).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, String> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(format!("Invalid currency code: {code}"))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
