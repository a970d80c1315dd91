//! Fund transfer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, FixedOffset, Utc};
use fundledger_core::fund::TransferStatus;
use fundledger_db::entities::fund_transfers;
use fundledger_db::repositories::{TransferDetail, TransferFilter, TransferInput};
use fundledger_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{fund_sources::TransactionResponse, parse_param};
use crate::{
    AppState,
    error::ApiError,
    extractors::{Actor, ValidatedJson},
};

/// Creates the fund transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fund-transfers", get(list_transfers).post(create_transfer))
        .route("/fund-transfers/{id}", get(get_transfer))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transfers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransfersQuery {
    /// Filter by source fund.
    pub from_fund_source_id: Option<Uuid>,
    /// Filter by destination fund.
    pub to_fund_source_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<String>,
    /// Inclusive lower bound on the transfer date.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the transfer date.
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub page_size: Option<u64>,
}

/// Request body for a transfer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    /// Fund to debit.
    pub from_fund_source_id: Uuid,
    /// Fund to credit.
    pub to_fund_source_id: Uuid,
    /// Gross amount.
    pub amount: Decimal,
    /// Fee charged to the source.
    #[serde(default)]
    pub transfer_fee: Decimal,
    /// Note added to both legs.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Business date; defaults to now.
    pub transfer_date: Option<DateTime<Utc>>,
}

/// Response for a transfer record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Transfer ID.
    pub id: Uuid,
    /// `TRF-YYYYMMDD-NNNN`.
    pub transfer_number: String,
    /// Debited fund.
    pub from_fund_source_id: Uuid,
    /// Credited fund.
    pub to_fund_source_id: Uuid,
    /// Gross amount.
    pub amount: Decimal,
    /// Fee charged to the source.
    pub transfer_fee: Decimal,
    /// Amount credited to the destination.
    pub net_amount: Decimal,
    /// TRANSFER_OUT leg.
    pub out_transaction_id: Uuid,
    /// TRANSFER_IN leg.
    pub in_transaction_id: Uuid,
    /// Status.
    pub status: TransferStatus,
    /// Note.
    pub description: Option<String>,
    /// Business date.
    pub transfer_date: DateTime<FixedOffset>,
    /// Initiating user.
    pub created_by: Option<Uuid>,
    /// Write time.
    pub created_at: DateTime<FixedOffset>,
}

impl From<fund_transfers::Model> for TransferResponse {
    fn from(model: fund_transfers::Model) -> Self {
        Self {
            id: model.id,
            transfer_number: model.transfer_number,
            from_fund_source_id: model.from_fund_source_id,
            to_fund_source_id: model.to_fund_source_id,
            amount: model.amount,
            transfer_fee: model.transfer_fee,
            net_amount: model.net_amount,
            out_transaction_id: model.out_transaction_id,
            in_transaction_id: model.in_transaction_id,
            status: model.status.into(),
            description: model.description,
            transfer_date: model.transfer_date,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

/// Response for a transfer with both legs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetailResponse {
    /// The transfer record.
    #[serde(flatten)]
    pub transfer: TransferResponse,
    /// Debit leg.
    pub out_transaction: TransactionResponse,
    /// Credit leg.
    pub in_transaction: TransactionResponse,
}

impl From<TransferDetail> for TransferDetailResponse {
    fn from(detail: TransferDetail) -> Self {
        Self {
            transfer: detail.transfer.into(),
            out_transaction: detail.out_transaction.into(),
            in_transaction: detail.in_transaction.into(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/fund-transfers` - List transfers, newest first.
async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<ListTransfersQuery>,
) -> Result<Json<PageResponse<TransferResponse>>, ApiError> {
    let filter = TransferFilter {
        from_fund_source_id: query.from_fund_source_id,
        to_fund_source_id: query.to_fund_source_id,
        status: parse_param("status", query.status.as_deref())?,
        from: query.from,
        to: query.to,
    };
    let page = PageRequest::new(query.page, query.page_size);
    let transfers = state.fund_transfers().list(&filter, page).await?;
    Ok(Json(transfers.map(Into::into)))
}

/// POST `/fund-transfers` - Move money between two funds.
async fn create_transfer(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(req): ValidatedJson<CreateTransferRequest>,
) -> Result<(StatusCode, Json<TransferDetailResponse>), ApiError> {
    let detail = state
        .fund_transfers()
        .transfer(TransferInput {
            from_fund_source_id: req.from_fund_source_id,
            to_fund_source_id: req.to_fund_source_id,
            amount: req.amount,
            transfer_fee: req.transfer_fee,
            description: req.description,
            transfer_date: req.transfer_date,
            created_by: actor.id(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// GET `/fund-transfers/{id}` - Get a transfer with both legs.
async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransferDetailResponse>, ApiError> {
    Ok(Json(state.fund_transfers().get(id).await?.into()))
}
