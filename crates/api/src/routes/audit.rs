//! Balance audit routes.
//!
//! Read-only: an audit never corrects a balance, it only reports drift.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use fundledger_core::audit::{FundAuditItem, FundAuditReport};
use uuid::Uuid;

use super::fund_sources::BranchQuery;
use crate::{AppState, error::ApiError};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit/fund-sources", get(audit_all))
        .route("/audit/fund-sources/{id}", get(audit_one))
}

/// GET `/audit/fund-sources` - Replay every fund.
async fn audit_all(
    State(state): State<AppState>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<FundAuditReport>, ApiError> {
    Ok(Json(state.audits().audit_all(query.branch_id).await?))
}

/// GET `/audit/fund-sources/{id}` - Replay one fund.
async fn audit_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FundAuditItem>, ApiError> {
    Ok(Json(state.audits().audit_fund(id).await?))
}
