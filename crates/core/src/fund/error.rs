//! Fund ledger error types.
//!
//! Every business-rule rejection is raised before any write happens, so a
//! caller receiving one of these knows nothing was persisted.

use fundledger_shared::AppError;
use fundledger_shared::types::MAX_AMOUNT;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during fund ledger operations.
#[derive(Debug, Error)]
pub enum FundError {
    // ========== Validation Errors ==========
    /// A required field is missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field is present but malformed.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Field name as sent by the client.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// A balance or fee cannot be negative.
    #[error("{0} cannot be negative")]
    NegativeValue(&'static str),

    /// Amount carries more fractional digits than are stored.
    #[error("{0} has more than 4 decimal places")]
    ExcessPrecision(&'static str),

    /// Amount, or the balance it would produce, exceeds what can be stored.
    #[error("{0} exceeds the maximum of {max}", max = MAX_AMOUNT)]
    AmountTooLarge(&'static str),

    /// Transfer fee must leave a positive net amount.
    #[error("Transfer fee ({fee}) must be less than the transfer amount ({amount})")]
    FeeNotBelowAmount {
        /// Gross transfer amount.
        amount: Decimal,
        /// Requested fee.
        fee: Decimal,
    },

    /// Adjustment target equals the current balance.
    #[error("New balance equals the current balance ({0}); nothing to adjust")]
    NoBalanceChange(Decimal),

    /// Transaction kind cannot be posted through this operation.
    #[error("Transaction type {0} cannot be recorded manually")]
    UnsupportedTransactionType(&'static str),

    // ========== Conflict Errors ==========
    /// Another fund source already uses this code.
    #[error("Fund source code '{0}' already exists")]
    DuplicateCode(String),

    // ========== Balance Errors ==========
    /// Debit exceeds the available balance.
    #[error("Insufficient balance. Available: {available}, Required: {required}")]
    InsufficientBalance {
        /// Current balance of the fund.
        available: Decimal,
        /// Amount the operation would remove.
        required: Decimal,
    },

    // ========== Invalid Operation Errors ==========
    /// Transfer source and destination are the same fund.
    #[error("Cannot transfer to the same fund source")]
    SameFundSource,

    /// Fund is closed and accepts no further entries.
    #[error("Fund source {0} is closed")]
    FundSourceClosed(Uuid),

    // ========== Not Found Errors ==========
    /// Fund source not found.
    #[error("Fund source not found: {0}")]
    FundSourceNotFound(Uuid),

    /// Transfer not found.
    #[error("Fund transfer not found: {0}")]
    TransferNotFound(Uuid),

    // ========== Concurrency Errors ==========
    /// Another writer changed the fund between read and write.
    #[error("Fund source {0} was modified concurrently, please retry")]
    ConcurrentModification(Uuid),

    // ========== Infrastructure Errors ==========
    /// Stored data breaks a ledger invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FundError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::NonPositiveAmount
            | Self::NegativeValue(_)
            | Self::ExcessPrecision(_)
            | Self::AmountTooLarge(_)
            | Self::FeeNotBelowAmount { .. }
            | Self::NoBalanceChange(_)
            | Self::UnsupportedTransactionType(_) => "validation_error",
            Self::DuplicateCode(_) => "conflict",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::SameFundSource | Self::FundSourceClosed(_) => "invalid_operation",
            Self::FundSourceNotFound(_) | Self::TransferNotFound(_) => "not_found",
            Self::ConcurrentModification(_) => "concurrent_modification",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - every business-rule rejection
            Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::NonPositiveAmount
            | Self::NegativeValue(_)
            | Self::ExcessPrecision(_)
            | Self::AmountTooLarge(_)
            | Self::FeeNotBelowAmount { .. }
            | Self::NoBalanceChange(_)
            | Self::UnsupportedTransactionType(_)
            | Self::DuplicateCode(_)
            | Self::InsufficientBalance { .. }
            | Self::SameFundSource
            | Self::FundSourceClosed(_) => 400,

            // 404 Not Found
            Self::FundSourceNotFound(_) | Self::TransferNotFound(_) => 404,

            // 409 Conflict - lost write race
            Self::ConcurrentModification(_) => 409,

            // 500 Internal Server Error
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

impl From<FundError> for AppError {
    fn from(err: FundError) -> Self {
        let message = err.to_string();
        match err {
            FundError::MissingField(_)
            | FundError::InvalidField { .. }
            | FundError::NonPositiveAmount
            | FundError::NegativeValue(_)
            | FundError::ExcessPrecision(_)
            | FundError::AmountTooLarge(_)
            | FundError::FeeNotBelowAmount { .. }
            | FundError::NoBalanceChange(_)
            | FundError::UnsupportedTransactionType(_) => Self::Validation(message),
            FundError::DuplicateCode(_) => Self::Conflict(message),
            FundError::InsufficientBalance { .. }
            | FundError::SameFundSource
            | FundError::FundSourceClosed(_) => Self::BusinessRule(message),
            FundError::FundSourceNotFound(_) | FundError::TransferNotFound(_) => {
                Self::NotFound(message)
            }
            FundError::ConcurrentModification(_) => Self::ConcurrentModification(message),
            FundError::Internal(detail) => Self::Internal(detail),
        }
    }
}
