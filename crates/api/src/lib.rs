//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for fund sources, transfers and audits
//! - Request extractors
//! - Error to response mapping

pub mod error;
pub mod extractors;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use fundledger_db::{
    AuditRepository, FundSourceRepository, FundTransactionRepository, FundTransferRepository,
};
use fundledger_shared::LedgerConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Ledger behaviour settings.
    pub ledger: Arc<LedgerConfig>,
}

impl AppState {
    /// Creates the state from an open connection.
    #[must_use]
    pub fn new(db: DatabaseConnection, ledger: LedgerConfig) -> Self {
        Self {
            db: Arc::new(db),
            ledger: Arc::new(ledger),
        }
    }

    pub(crate) fn fund_sources(&self) -> FundSourceRepository {
        FundSourceRepository::new((*self.db).clone(), (*self.ledger).clone())
    }

    pub(crate) fn fund_transactions(&self) -> FundTransactionRepository {
        FundTransactionRepository::new((*self.db).clone())
    }

    pub(crate) fn fund_transfers(&self) -> FundTransferRepository {
        FundTransferRepository::new((*self.db).clone())
    }

    pub(crate) fn audits(&self) -> AuditRepository {
        AuditRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
