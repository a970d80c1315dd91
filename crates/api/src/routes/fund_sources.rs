//! Fund source routes.
//!
//! Registry CRUD, per-fund ledger history, manual postings, balance
//! adjustments and the summary views.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use fundledger_core::fund::{
    FlowDirection, FundSourceChanges, FundSourceType, FundStatus, FundSummary,
    FundTransactionType, LowBalanceAlert, NewFundSource, ReferenceType, mask_account_number,
};
use fundledger_db::entities::{fund_sources, fund_transactions};
use fundledger_db::repositories::{
    AdjustBalanceInput, DeleteOutcome, FundSourceFilter, RecentTransaction,
    RecordTransactionInput, RecordedTransaction, TransactionFilter,
};
use fundledger_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::parse_param;
use crate::{
    AppState,
    error::ApiError,
    extractors::{Actor, ValidatedJson},
};

/// Creates the fund source routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fund-sources", get(list_fund_sources).post(create_fund_source))
        .route("/fund-sources/by-branch", get(fund_sources_by_branch))
        .route("/fund-sources/summary", get(fund_summary))
        .route("/fund-sources/dashboard", get(dashboard))
        .route("/fund-sources/default", get(default_fund_source))
        .route(
            "/fund-sources/{id}",
            get(get_fund_source)
                .put(update_fund_source)
                .delete(delete_fund_source),
        )
        .route(
            "/fund-sources/{id}/transactions",
            get(list_transactions).post(record_transaction),
        )
        .route("/fund-sources/{id}/adjust", post(adjust_balance))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing fund sources.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFundSourcesQuery {
    /// Only funds assigned to this branch.
    pub branch_id: Option<Uuid>,
    /// Filter by fund type.
    #[serde(rename = "type")]
    pub fund_type: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
}

/// Query parameter selecting a branch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchQuery {
    /// Branch; company-wide funds are always included.
    pub branch_id: Option<Uuid>,
}

/// Query parameters for the default fund lookup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultFundQuery {
    /// Branch asking for its default.
    pub branch_id: Option<Uuid>,
    /// Restrict to one fund type.
    #[serde(rename = "type")]
    pub fund_type: Option<String>,
}

/// Query parameters for a fund's ledger history.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Filter by entry kind.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Filter by reference kind.
    pub reference_type: Option<String>,
    /// Inclusive lower bound on the transaction date.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the transaction date.
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub page_size: Option<u64>,
}

/// Request body for creating a fund source.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFundSourceRequest {
    /// Display name.
    #[validate(length(max = 100))]
    pub name: String,
    /// Unique code.
    #[validate(length(max = 50))]
    pub code: String,
    /// Fund type.
    #[serde(rename = "type")]
    pub fund_type: FundSourceType,
    /// Owning branch; omitted for company-wide funds.
    pub branch_id: Option<Uuid>,
    /// Balance at creation.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Currency code.
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    /// Bank name.
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    /// Bank account number.
    #[validate(length(max = 50))]
    pub account_number: Option<String>,
    /// Bank account holder.
    #[validate(length(max = 100))]
    pub account_holder: Option<String>,
    /// Free-form description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Default fund for its scope.
    #[serde(default)]
    pub is_default: bool,
    /// Sort position.
    #[serde(default)]
    pub display_order: i32,
}

/// Request body for updating a fund source.
///
/// Absent fields are left alone; `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFundSourceRequest {
    /// Display name.
    #[validate(length(max = 100))]
    pub name: Option<String>,
    /// Unique code.
    #[validate(length(max = 50))]
    pub code: Option<String>,
    /// Fund type.
    #[serde(rename = "type")]
    pub fund_type: Option<FundSourceType>,
    /// Owning branch.
    #[serde(default, deserialize_with = "double_option")]
    pub branch_id: Option<Option<Uuid>>,
    /// Bank name.
    #[serde(default, deserialize_with = "double_option")]
    pub bank_name: Option<Option<String>>,
    /// Bank account number.
    #[serde(default, deserialize_with = "double_option")]
    pub account_number: Option<Option<String>>,
    /// Bank account holder.
    #[serde(default, deserialize_with = "double_option")]
    pub account_holder: Option<Option<String>>,
    /// Free-form description.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Currency code.
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    /// Lifecycle status.
    pub status: Option<FundStatus>,
    /// Default fund for its scope.
    pub is_default: Option<bool>,
    /// Sort position.
    pub display_order: Option<i32>,
}

/// Request body for a manual deposit or withdrawal.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    /// `DEPOSIT` or `WITHDRAWAL`.
    #[serde(rename = "type")]
    pub transaction_type: FundTransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Free text.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Originating document kind.
    pub reference_type: Option<ReferenceType>,
    /// Originating document ID.
    pub reference_id: Option<Uuid>,
    /// Business date; defaults to now.
    pub transaction_date: Option<DateTime<Utc>>,
}

/// Request body for a balance adjustment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustBalanceRequest {
    /// Counted balance to adjust to.
    pub new_balance: Decimal,
    /// Why the balance is being corrected.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Response for a fund source.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSourceResponse {
    /// Fund source ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique code.
    pub code: String,
    /// Fund type.
    #[serde(rename = "type")]
    pub fund_type: FundSourceType,
    /// Owning branch.
    pub branch_id: Option<Uuid>,
    /// Balance at creation.
    pub opening_balance: Decimal,
    /// Balance now.
    pub current_balance: Decimal,
    /// Currency code.
    pub currency: String,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Account number, masked to its last four characters.
    pub account_number: Option<String>,
    /// Bank account holder.
    pub account_holder: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Default fund for its scope.
    pub is_default: bool,
    /// Sort position.
    pub display_order: i32,
    /// Lifecycle status.
    pub status: FundStatus,
    /// Number of ledger entries written.
    pub version: i64,
    /// Creating user.
    pub created_by: Option<Uuid>,
    /// Last updating user.
    pub updated_by: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl From<fund_sources::Model> for FundSourceResponse {
    fn from(model: fund_sources::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            fund_type: model.fund_type.into(),
            branch_id: model.branch_id,
            opening_balance: model.opening_balance,
            current_balance: model.current_balance,
            currency: model.currency,
            bank_name: model.bank_name,
            account_number: model.account_number.as_deref().map(mask_account_number),
            account_holder: model.account_holder,
            description: model.description,
            is_default: model.is_default,
            display_order: model.display_order,
            status: model.status.into(),
            version: model.version,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Response for a ledger entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Fund the entry belongs to.
    pub fund_source_id: Uuid,
    /// Entry kind.
    #[serde(rename = "type")]
    pub transaction_type: FundTransactionType,
    /// Balance direction.
    pub direction: FlowDirection,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Balance right after the entry.
    pub running_balance: Decimal,
    /// Position in the fund's ledger.
    pub sequence: i64,
    /// Originating document kind.
    pub reference_type: Option<ReferenceType>,
    /// Originating document ID.
    pub reference_id: Option<Uuid>,
    /// Description.
    pub description: String,
    /// Business date.
    pub transaction_date: DateTime<FixedOffset>,
    /// Recording user.
    pub created_by: Option<Uuid>,
    /// Write time.
    pub created_at: DateTime<FixedOffset>,
}

impl From<fund_transactions::Model> for TransactionResponse {
    fn from(model: fund_transactions::Model) -> Self {
        Self {
            id: model.id,
            fund_source_id: model.fund_source_id,
            transaction_type: model.transaction_type.into(),
            direction: model.direction.into(),
            amount: model.amount,
            running_balance: model.running_balance,
            sequence: model.sequence,
            reference_type: model.reference_type.map(Into::into),
            reference_id: model.reference_id,
            description: model.description,
            transaction_date: model.transaction_date,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

/// Response for a listing of fund sources.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSourceListResponse {
    /// Matching fund sources.
    pub fund_sources: Vec<FundSourceResponse>,
}

/// Response for a posting: the entry and the fund after it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedTransactionResponse {
    /// Fund after the entry.
    pub fund_source: FundSourceResponse,
    /// The entry written.
    pub transaction: TransactionResponse,
}

impl From<RecordedTransaction> for RecordedTransactionResponse {
    fn from(recorded: RecordedTransaction) -> Self {
        Self {
            fund_source: recorded.fund_source.into(),
            transaction: recorded.transaction.into(),
        }
    }
}

/// Response for a delete request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFundSourceResponse {
    /// `closed` when history kept the fund, `deleted` when it was removed.
    pub outcome: &'static str,
    /// The closed fund, when it was kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fund_source: Option<FundSourceResponse>,
}

/// A recent entry with its fund's name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTransactionResponse {
    /// The entry.
    #[serde(flatten)]
    pub transaction: TransactionResponse,
    /// Fund display name.
    pub fund_source_name: String,
    /// Fund code.
    pub fund_source_code: String,
}

impl From<RecentTransaction> for RecentTransactionResponse {
    fn from(recent: RecentTransaction) -> Self {
        Self {
            transaction: recent.transaction.into(),
            fund_source_name: recent.fund_source_name,
            fund_source_code: recent.fund_source_code,
        }
    }
}

/// Dashboard payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Totals over non-closed funds.
    pub summary: FundSummary,
    /// Latest entries.
    pub recent_transactions: Vec<RecentTransactionResponse>,
    /// Active funds below the low-balance threshold.
    pub low_balance_alerts: Vec<LowBalanceAlert>,
}

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/fund-sources` - List fund sources.
async fn list_fund_sources(
    State(state): State<AppState>,
    Query(query): Query<ListFundSourcesQuery>,
) -> Result<Json<FundSourceListResponse>, ApiError> {
    let filter = FundSourceFilter {
        branch_id: query.branch_id,
        fund_type: parse_param("type", query.fund_type.as_deref())?,
        status: parse_param("status", query.status.as_deref())?,
        search: query.search,
    };
    let funds = state.fund_sources().list(&filter).await?;
    Ok(Json(FundSourceListResponse {
        fund_sources: funds.into_iter().map(Into::into).collect(),
    }))
}

/// POST `/fund-sources` - Create a fund source with its opening balance.
async fn create_fund_source(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(req): ValidatedJson<CreateFundSourceRequest>,
) -> Result<(StatusCode, Json<FundSourceResponse>), ApiError> {
    let input = NewFundSource {
        name: req.name,
        code: req.code,
        fund_type: req.fund_type,
        branch_id: req.branch_id,
        opening_balance: req.opening_balance,
        currency: req.currency,
        bank_name: req.bank_name,
        account_number: req.account_number,
        account_holder: req.account_holder,
        description: req.description,
        is_default: req.is_default,
        display_order: req.display_order,
    };
    let fund = state.fund_sources().create(input, actor.id()).await?;
    Ok((StatusCode::CREATED, Json(fund.into())))
}

/// GET `/fund-sources/by-branch` - Non-closed funds usable by a branch.
async fn fund_sources_by_branch(
    State(state): State<AppState>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<FundSourceListResponse>, ApiError> {
    let funds = state.fund_sources().find_by_branch(query.branch_id).await?;
    Ok(Json(FundSourceListResponse {
        fund_sources: funds.into_iter().map(Into::into).collect(),
    }))
}

/// GET `/fund-sources/summary` - Totals by type and branch.
async fn fund_summary(
    State(state): State<AppState>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<FundSummary>, ApiError> {
    Ok(Json(state.fund_sources().summary(query.branch_id).await?))
}

/// GET `/fund-sources/dashboard` - Summary, recent entries and alerts.
async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let funds = state.fund_sources();
    let summary = funds.summary(query.branch_id).await?;
    let low_balance_alerts = funds.low_balance_alerts(query.branch_id).await?;
    let recent = state
        .fund_transactions()
        .recent(query.branch_id, state.ledger.recent_transactions_limit)
        .await?;

    Ok(Json(DashboardResponse {
        summary,
        recent_transactions: recent.into_iter().map(Into::into).collect(),
        low_balance_alerts,
    }))
}

/// GET `/fund-sources/default` - Default fund for a branch.
async fn default_fund_source(
    State(state): State<AppState>,
    Query(query): Query<DefaultFundQuery>,
) -> Result<Json<FundSourceResponse>, ApiError> {
    let fund_type = parse_param("type", query.fund_type.as_deref())?;
    state
        .fund_sources()
        .find_default(query.branch_id, fund_type)
        .await?
        .map(|fund| Json(fund.into()))
        .ok_or_else(|| ApiError::NotFound("No default fund source is configured".to_string()))
}

/// GET `/fund-sources/{id}` - Get one fund source.
async fn get_fund_source(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FundSourceResponse>, ApiError> {
    Ok(Json(state.fund_sources().get(id).await?.into()))
}

/// PUT `/fund-sources/{id}` - Update fund source attributes.
async fn update_fund_source(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateFundSourceRequest>,
) -> Result<Json<FundSourceResponse>, ApiError> {
    let changes = FundSourceChanges {
        name: req.name,
        code: req.code,
        fund_type: req.fund_type,
        branch_id: req.branch_id,
        bank_name: req.bank_name,
        account_number: req.account_number,
        account_holder: req.account_holder,
        description: req.description,
        currency: req.currency,
        status: req.status,
        is_default: req.is_default,
        display_order: req.display_order,
    };
    let fund = state.fund_sources().update(id, changes, actor.id()).await?;
    Ok(Json(fund.into()))
}

/// DELETE `/fund-sources/{id}` - Close or remove a fund source.
async fn delete_fund_source(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteFundSourceResponse>, ApiError> {
    let response = match state.fund_sources().delete(id, actor.id()).await? {
        DeleteOutcome::Closed(fund) => DeleteFundSourceResponse {
            outcome: "closed",
            fund_source: Some(fund.into()),
        },
        DeleteOutcome::Deleted => DeleteFundSourceResponse {
            outcome: "deleted",
            fund_source: None,
        },
    };
    Ok(Json(response))
}

/// GET `/fund-sources/{id}/transactions` - Paginated ledger history.
async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<PageResponse<TransactionResponse>>, ApiError> {
    let filter = TransactionFilter {
        transaction_type: parse_param("type", query.transaction_type.as_deref())?,
        reference_type: parse_param("referenceType", query.reference_type.as_deref())?,
        from: query.from,
        to: query.to,
    };
    let page = PageRequest::new(query.page, query.page_size);
    let history = state.fund_transactions().history(id, &filter, page).await?;
    Ok(Json(history.map(Into::into)))
}

/// POST `/fund-sources/{id}/transactions` - Record a deposit or withdrawal.
async fn record_transaction(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RecordTransactionRequest>,
) -> Result<(StatusCode, Json<RecordedTransactionResponse>), ApiError> {
    let recorded = state
        .fund_transactions()
        .record(RecordTransactionInput {
            fund_source_id: id,
            transaction_type: req.transaction_type,
            amount: req.amount,
            description: req.description,
            reference_type: req.reference_type,
            reference_id: req.reference_id,
            transaction_date: req.transaction_date,
            created_by: actor.id(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(recorded.into())))
}

/// POST `/fund-sources/{id}/adjust` - Adjust to a counted balance.
async fn adjust_balance(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AdjustBalanceRequest>,
) -> Result<Json<RecordedTransactionResponse>, ApiError> {
    let recorded = state
        .fund_transactions()
        .adjust(AdjustBalanceInput {
            fund_source_id: id,
            new_balance: req.new_balance,
            reason: req.reason,
            created_by: actor.id(),
        })
        .await?;
    Ok(Json(recorded.into()))
}
