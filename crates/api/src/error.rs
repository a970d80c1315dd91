//! API error responses.
//!
//! Every failure leaves the handler as `{"error": "<code>", "message": "..."}`
//! with the status its error kind maps to.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fundledger_core::fund::FundError;
use fundledger_db::FundRepoError;
use fundledger_shared::AppError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Ledger rule or storage failure.
    #[error(transparent)]
    Ledger(#[from] FundRepoError),

    /// Malformed request that never reached the ledger.
    #[error("{0}")]
    Validation(String),

    /// Lookup with no match that is not tied to a single id.
    #[error("{0}")]
    NotFound(String),
}

impl From<FundError> for ApiError {
    fn from(err: FundError) -> Self {
        Self::Ledger(err.into())
    }
}

impl ApiError {
    /// Returns the snake_case error code sent to clients.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let app = match self {
            Self::Ledger(err) => AppError::from(err),
            Self::Validation(message) => AppError::Validation(message),
            Self::NotFound(message) => AppError::NotFound(message),
        };
        let status =
            StatusCode::from_u16(app.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %app, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": app.public_message(),
            })),
        )
            .into_response()
    }
}
