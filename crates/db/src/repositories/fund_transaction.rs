//! Fund transaction repository.
//!
//! Records manual deposits and withdrawals, balance adjustments, and serves
//! the per-fund ledger history.

use chrono::{DateTime, FixedOffset, Utc};
use fundledger_core::fund::{
    FundError, FundTransactionType, Posting, ReferenceType, adjustment_description,
    manual_description, normalize_reason,
};
use fundledger_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::error::FundRepoError;
use super::fund_source::branch_scope;
use super::posting::{EntryMeta, append_entry, lock_fund};
use crate::entities::{fund_sources, fund_transactions, sea_orm_active_enums as db_enums};

/// Input for recording a manual deposit or withdrawal.
#[derive(Debug, Clone)]
pub struct RecordTransactionInput {
    /// Fund to post to.
    pub fund_source_id: Uuid,
    /// `Deposit` or `Withdrawal`.
    pub transaction_type: FundTransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Free text; a default is used when blank.
    pub description: Option<String>,
    /// Originating document kind.
    pub reference_type: Option<ReferenceType>,
    /// Originating document ID.
    pub reference_id: Option<Uuid>,
    /// Business date; defaults to now.
    pub transaction_date: Option<DateTime<Utc>>,
    /// Acting user.
    pub created_by: Option<Uuid>,
}

/// Input for adjusting a fund to a counted balance.
#[derive(Debug, Clone)]
pub struct AdjustBalanceInput {
    /// Fund to adjust.
    pub fund_source_id: Uuid,
    /// Target balance.
    pub new_balance: Decimal,
    /// Why the balance is being corrected. Required.
    pub reason: Option<String>,
    /// Acting user.
    pub created_by: Option<Uuid>,
}

/// Filter options for a fund's transaction history.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to one entry kind.
    pub transaction_type: Option<FundTransactionType>,
    /// Restrict to one reference kind.
    pub reference_type: Option<ReferenceType>,
    /// Inclusive lower bound on the transaction date.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the transaction date.
    pub to: Option<DateTime<Utc>>,
}

/// A successfully written entry together with the fund it moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransaction {
    /// Fund after the entry.
    pub fund_source: fund_sources::Model,
    /// The entry written.
    pub transaction: fund_transactions::Model,
}

/// A recent entry with the name of its fund, for dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentTransaction {
    /// The entry.
    pub transaction: fund_transactions::Model,
    /// Fund display name.
    pub fund_source_name: String,
    /// Fund code.
    pub fund_source_code: String,
}

/// Fund transaction repository.
#[derive(Debug, Clone)]
pub struct FundTransactionRepository {
    db: DatabaseConnection,
}

impl FundTransactionRepository {
    /// Creates a new fund transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a manual deposit or withdrawal.
    ///
    /// The entry and the new fund balance are written in one database
    /// transaction.
    ///
    /// # Errors
    ///
    /// - `UnsupportedTransactionType` for anything but deposits and withdrawals
    /// - `FundSourceNotFound` if the fund does not exist
    /// - `InsufficientBalance` if a withdrawal exceeds the balance
    /// - `ConcurrentModification` if another writer got there first
    pub async fn record(
        &self,
        input: RecordTransactionInput,
    ) -> Result<RecordedTransaction, FundRepoError> {
        if !input.transaction_type.is_manual() {
            return Err(
                FundError::UnsupportedTransactionType(input.transaction_type.as_str()).into(),
            );
        }

        let txn = self.db.begin().await?;
        let fund = lock_fund(&txn, input.fund_source_id).await?;
        let posting = Posting::plan(&fund.balance_state(), input.transaction_type, input.amount)?;

        let transaction = append_entry(
            &txn,
            &fund,
            &posting,
            EntryMeta {
                reference_type: input.reference_type,
                reference_id: input.reference_id,
                description: manual_description(
                    input.transaction_type,
                    input.description.as_deref(),
                ),
                transaction_date: input.transaction_date.unwrap_or_else(Utc::now).into(),
                created_by: input.created_by,
            },
        )
        .await?;
        let fund_source = lock_fund(&txn, fund.id).await?;
        txn.commit().await?;

        info!(
            fund_source_id = %fund_source.id,
            transaction_id = %transaction.id,
            transaction_type = input.transaction_type.as_str(),
            amount = %input.amount,
            running_balance = %transaction.running_balance,
            "Fund transaction recorded"
        );
        Ok(RecordedTransaction {
            fund_source,
            transaction,
        })
    }

    /// Adjusts a fund to a target balance.
    ///
    /// Writes one `ADJUSTMENT` entry for `|new_balance - current_balance|`
    /// whose description carries the reason.
    ///
    /// # Errors
    ///
    /// - `MissingField("reason")` if no reason is given
    /// - `NoBalanceChange` if the target equals the current balance
    /// - `FundSourceNotFound` if the fund does not exist
    /// - `ConcurrentModification` if another writer got there first
    pub async fn adjust(
        &self,
        input: AdjustBalanceInput,
    ) -> Result<RecordedTransaction, FundRepoError> {
        let reason = normalize_reason(input.reason.as_deref())?;

        let txn = self.db.begin().await?;
        let fund = lock_fund(&txn, input.fund_source_id).await?;
        let posting = Posting::plan_adjustment(&fund.balance_state(), input.new_balance)?;
        let now: DateTime<FixedOffset> = Utc::now().into();

        let transaction = append_entry(
            &txn,
            &fund,
            &posting,
            EntryMeta {
                reference_type: Some(ReferenceType::Adjustment),
                reference_id: None,
                description: adjustment_description(&reason),
                transaction_date: now,
                created_by: input.created_by,
            },
        )
        .await?;
        let fund_source = lock_fund(&txn, fund.id).await?;
        txn.commit().await?;

        info!(
            fund_source_id = %fund_source.id,
            previous_balance = %fund.current_balance,
            new_balance = %fund_source.current_balance,
            "Fund balance adjusted"
        );
        Ok(RecordedTransaction {
            fund_source,
            transaction,
        })
    }

    /// Lists a fund's ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `FundSourceNotFound` if the fund does not exist.
    pub async fn history(
        &self,
        fund_source_id: Uuid,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<fund_transactions::Model>, FundRepoError> {
        fund_sources::Entity::find_by_id(fund_source_id)
            .one(&self.db)
            .await?
            .ok_or(FundRepoError::Fund(FundError::FundSourceNotFound(
                fund_source_id,
            )))?;

        let mut query = fund_transactions::Entity::find()
            .filter(fund_transactions::Column::FundSourceId.eq(fund_source_id));
        if let Some(kind) = filter.transaction_type {
            query = query.filter(
                fund_transactions::Column::TransactionType
                    .eq(db_enums::FundTransactionType::from(kind)),
            );
        }
        if let Some(reference_type) = filter.reference_type {
            query = query.filter(
                fund_transactions::Column::ReferenceType
                    .eq(db_enums::ReferenceType::from(reference_type)),
            );
        }
        if let Some(from) = filter.from {
            query = query.filter(
                fund_transactions::Column::TransactionDate.gte(DateTime::<FixedOffset>::from(from)),
            );
        }
        if let Some(to) = filter.to {
            query = query.filter(
                fund_transactions::Column::TransactionDate.lte(DateTime::<FixedOffset>::from(to)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(fund_transactions::Column::Sequence)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(items, page, total))
    }

    /// Latest entries across non-closed funds, optionally for one branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn recent(
        &self,
        branch_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<RecentTransaction>, FundRepoError> {
        let mut query = fund_transactions::Entity::find()
            .find_also_related(fund_sources::Entity)
            .filter(fund_sources::Column::Status.ne(db_enums::FundStatus::Closed));
        if let Some(branch_id) = branch_id {
            query = query.filter(branch_scope(branch_id));
        }

        let rows = query
            .order_by_desc(fund_transactions::Column::CreatedAt)
            .order_by_desc(fund_transactions::Column::Sequence)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(transaction, fund)| {
                fund.map(|fund| RecentTransaction {
                    transaction,
                    fund_source_name: fund.name,
                    fund_source_code: fund.code,
                })
            })
            .collect())
    }
}
