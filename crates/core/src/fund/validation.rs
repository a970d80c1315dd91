//! Input validation for fund ledger operations.

use fundledger_shared::types::{CurrencyCode, has_valid_scale, is_within_limit};
use rust_decimal::Decimal;

use super::error::FundError;
use super::types::{FundSourceChanges, FundTransactionType, NewFundSource};

/// Longest fund source name accepted.
pub const MAX_NAME_LEN: usize = 100;

/// Longest fund source code accepted.
pub const MAX_CODE_LEN: usize = 50;

/// Validates a strictly positive money amount.
///
/// # Errors
///
/// Returns `NonPositiveAmount`, `AmountTooLarge` or `ExcessPrecision`.
pub fn validate_amount(field: &'static str, amount: Decimal) -> Result<(), FundError> {
    if amount <= Decimal::ZERO {
        return Err(FundError::NonPositiveAmount);
    }
    if !is_within_limit(amount) {
        return Err(FundError::AmountTooLarge(field));
    }
    if !has_valid_scale(amount) {
        return Err(FundError::ExcessPrecision(field));
    }
    Ok(())
}

/// Validates a non-negative money amount such as an opening balance or a fee.
///
/// # Errors
///
/// Returns `NegativeValue`, `AmountTooLarge` or `ExcessPrecision`.
pub fn validate_non_negative(field: &'static str, amount: Decimal) -> Result<(), FundError> {
    if amount < Decimal::ZERO {
        return Err(FundError::NegativeValue(field));
    }
    if !is_within_limit(amount) {
        return Err(FundError::AmountTooLarge(field));
    }
    if !has_valid_scale(amount) {
        return Err(FundError::ExcessPrecision(field));
    }
    Ok(())
}

/// Trims a display name and checks it is present and not too long.
///
/// # Errors
///
/// Returns `MissingField` or `InvalidField`.
pub fn normalize_name(name: &str) -> Result<String, FundError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FundError::MissingField("name"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(FundError::InvalidField {
            field: "name",
            reason: format!("must be at most {MAX_NAME_LEN} characters"),
        });
    }
    Ok(name.to_string())
}

/// Trims a fund code and checks its character set.
///
/// Codes are letters, digits, `-` and `_`; case is preserved.
///
/// # Errors
///
/// Returns `MissingField` or `InvalidField`.
pub fn normalize_code(code: &str) -> Result<String, FundError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(FundError::MissingField("code"));
    }
    if code.len() > MAX_CODE_LEN {
        return Err(FundError::InvalidField {
            field: "code",
            reason: format!("must be at most {MAX_CODE_LEN} characters"),
        });
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FundError::InvalidField {
            field: "code",
            reason: "may only contain letters, digits, '-' and '_'".to_string(),
        });
    }
    Ok(code.to_string())
}

/// Parses a currency code.
///
/// # Errors
///
/// Returns `InvalidField` unless the code is three letters.
pub fn normalize_currency(currency: &str) -> Result<String, FundError> {
    CurrencyCode::parse(currency)
        .map(String::from)
        .map_err(|reason| FundError::InvalidField {
            field: "currency",
            reason,
        })
}

/// Checks the reason given for a balance adjustment.
///
/// # Errors
///
/// Returns `MissingField` if the reason is absent or blank.
pub fn normalize_reason(reason: Option<&str>) -> Result<String, FundError> {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => Ok(reason.to_string()),
        _ => Err(FundError::MissingField("reason")),
    }
}

/// Validates and normalizes a new fund source.
///
/// Blank optional strings become `None` and a missing currency falls back
/// to `default_currency`.
///
/// # Errors
///
/// Returns the first validation failure found.
pub fn validate_new_fund_source(
    mut input: NewFundSource,
    default_currency: &str,
) -> Result<NewFundSource, FundError> {
    input.name = normalize_name(&input.name)?;
    input.code = normalize_code(&input.code)?;
    validate_non_negative("openingBalance", input.opening_balance)?;
    let currency = non_blank(input.currency.take()).unwrap_or_else(|| default_currency.to_string());
    input.currency = Some(normalize_currency(&currency)?);
    input.bank_name = non_blank(input.bank_name);
    input.account_number = non_blank(input.account_number);
    input.account_holder = non_blank(input.account_holder);
    input.description = non_blank(input.description);
    Ok(input)
}

/// Validates and normalizes fund source changes.
///
/// # Errors
///
/// Returns the first validation failure found.
pub fn validate_changes(mut changes: FundSourceChanges) -> Result<FundSourceChanges, FundError> {
    if let Some(name) = changes.name.as_deref() {
        changes.name = Some(normalize_name(name)?);
    }
    if let Some(code) = changes.code.as_deref() {
        changes.code = Some(normalize_code(code)?);
    }
    if let Some(currency) = changes.currency.as_deref() {
        changes.currency = Some(normalize_currency(currency)?);
    }
    changes.bank_name = changes.bank_name.map(non_blank);
    changes.account_number = changes.account_number.map(non_blank);
    changes.account_holder = changes.account_holder.map(non_blank);
    changes.description = changes.description.map(non_blank);
    Ok(changes)
}

/// Returns the stored description for a manual posting.
#[must_use]
pub fn manual_description(
    transaction_type: FundTransactionType,
    description: Option<&str>,
) -> String {
    match description.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => match transaction_type {
            FundTransactionType::Withdrawal => "Manual withdrawal".to_string(),
            _ => "Manual deposit".to_string(),
        },
    }
}

/// Returns the stored description for an adjustment.
#[must_use]
pub fn adjustment_description(reason: &str) -> String {
    format!("Balance adjustment: {reason}")
}

/// Masks an account number down to its last four characters.
#[must_use]
pub fn mask_account_number(account_number: &str) -> String {
    let chars: Vec<char> = account_number.chars().collect();
    if chars.len() <= 4 {
        return account_number.to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
