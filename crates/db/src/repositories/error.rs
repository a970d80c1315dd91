//! Error type shared by the fund ledger repositories.

use fundledger_core::fund::FundError;
use fundledger_shared::AppError;
use sea_orm::{DbErr, SqlErr};

/// Error types for fund ledger repository operations.
#[derive(Debug, thiserror::Error)]
pub enum FundRepoError {
    /// Business rule rejected the operation before anything was written.
    #[error(transparent)]
    Fund(#[from] FundError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl FundRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Fund(err) => err.error_code(),
            Self::Database(_) => "database_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Fund(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fund(err) if err.is_retryable())
    }
}

impl From<FundRepoError> for AppError {
    fn from(err: FundRepoError) -> Self {
        match err {
            FundRepoError::Fund(err) => err.into(),
            FundRepoError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

/// Returns true if the statement failed on a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
