//! Fund transfer repository.
//!
//! A transfer debits the source by `amount + fee`, credits the destination
//! by `amount - fee` and records both legs under one transfer number, all in
//! a single database transaction.

use chrono::{DateTime, FixedOffset, Utc};
use fundledger_core::fund::{
    FundError, ReferenceType, TransferPlan, TransferStatus, incoming_description,
    next_transfer_number, outgoing_description, transfer_number_prefix,
};
use fundledger_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::{FundRepoError, is_unique_violation};
use super::posting::{EntryMeta, append_entry, lock_fund};
use crate::entities::{fund_transactions, fund_transfers, sea_orm_active_enums as db_enums};

/// Times a transfer number is re-issued after losing a race for it.
const NUMBER_ATTEMPTS: u32 = 5;

/// Input for a fund-to-fund transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Fund to debit.
    pub from_fund_source_id: Uuid,
    /// Fund to credit.
    pub to_fund_source_id: Uuid,
    /// Gross amount.
    pub amount: Decimal,
    /// Fee charged to the source; zero when absent.
    pub transfer_fee: Decimal,
    /// Free-text note appended to both leg descriptions.
    pub description: Option<String>,
    /// Business date; defaults to now.
    pub transfer_date: Option<DateTime<Utc>>,
    /// Acting user.
    pub created_by: Option<Uuid>,
}

/// Filter options for listing transfers.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Restrict to transfers out of this fund.
    pub from_fund_source_id: Option<Uuid>,
    /// Restrict to transfers into this fund.
    pub to_fund_source_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<TransferStatus>,
    /// Inclusive lower bound on the transfer date.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the transfer date.
    pub to: Option<DateTime<Utc>>,
}

/// A transfer together with both of its legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDetail {
    /// The transfer record.
    pub transfer: fund_transfers::Model,
    /// TRANSFER_OUT leg on the source fund.
    pub out_transaction: fund_transactions::Model,
    /// TRANSFER_IN leg on the destination fund.
    pub in_transaction: fund_transactions::Model,
}

/// Fund transfer repository.
#[derive(Debug, Clone)]
pub struct FundTransferRepository {
    db: DatabaseConnection,
}

impl FundTransferRepository {
    /// Creates a new fund transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Executes a transfer.
    ///
    /// Both funds are locked in ID order so two opposite transfers cannot
    /// deadlock. Every rule is checked before the first write.
    ///
    /// # Errors
    ///
    /// - `SameFundSource` if source and destination are equal
    /// - `FundSourceNotFound` if either fund does not exist
    /// - `InsufficientBalance` if the source cannot cover `amount + fee`
    /// - `ConcurrentModification` if another writer got there first
    pub async fn transfer(&self, input: TransferInput) -> Result<TransferDetail, FundRepoError> {
        if input.from_fund_source_id == input.to_fund_source_id {
            return Err(FundError::SameFundSource.into());
        }

        let txn = self.db.begin().await?;

        let (from, to) = if input.from_fund_source_id < input.to_fund_source_id {
            let from = lock_fund(&txn, input.from_fund_source_id).await?;
            let to = lock_fund(&txn, input.to_fund_source_id).await?;
            (from, to)
        } else {
            let to = lock_fund(&txn, input.to_fund_source_id).await?;
            let from = lock_fund(&txn, input.from_fund_source_id).await?;
            (from, to)
        };

        let plan = TransferPlan::plan(
            &from.balance_state(),
            &to.balance_state(),
            input.amount,
            input.transfer_fee,
        )?;

        let transfer_id = Uuid::now_v7();
        let transfer_date: DateTime<FixedOffset> =
            input.transfer_date.unwrap_or_else(Utc::now).into();
        let note = input.description.as_deref();

        let out_transaction = append_entry(
            &txn,
            &from,
            &plan.out_leg,
            EntryMeta {
                reference_type: Some(ReferenceType::Transfer),
                reference_id: Some(transfer_id),
                description: outgoing_description(&to.name, plan.fee, note),
                transaction_date: transfer_date,
                created_by: input.created_by,
            },
        )
        .await?;

        let in_transaction = append_entry(
            &txn,
            &to,
            &plan.in_leg,
            EntryMeta {
                reference_type: Some(ReferenceType::Transfer),
                reference_id: Some(transfer_id),
                description: incoming_description(&from.name, note),
                transaction_date: transfer_date,
                created_by: input.created_by,
            },
        )
        .await?;

        let record = fund_transfers::ActiveModel {
            id: Set(transfer_id),
            from_fund_source_id: Set(from.id),
            to_fund_source_id: Set(to.id),
            amount: Set(plan.amount),
            transfer_fee: Set(plan.fee),
            net_amount: Set(plan.net_amount),
            out_transaction_id: Set(out_transaction.id),
            in_transaction_id: Set(in_transaction.id),
            status: Set(TransferStatus::Completed.into()),
            description: Set(note.map(str::trim).filter(|n| !n.is_empty()).map(String::from)),
            transfer_date: Set(transfer_date),
            created_by: Set(input.created_by),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let mut attempt = 1;
        let transfer = loop {
            let mut candidate = record.clone();
            candidate.transfer_number = Set(next_number(&txn, transfer_date.date_naive()).await?);

            // Savepoint so a lost race on the number leaves the legs intact.
            let savepoint = txn.begin().await?;
            match candidate.insert(&savepoint).await {
                Ok(transfer) => {
                    savepoint.commit().await?;
                    break transfer;
                }
                Err(err) if is_unique_violation(&err) && attempt < NUMBER_ATTEMPTS => {
                    savepoint.rollback().await?;
                    warn!(transfer_id = %transfer_id, attempt, "Transfer number taken, retrying");
                    attempt += 1;
                }
                Err(err) if is_unique_violation(&err) => {
                    savepoint.rollback().await?;
                    warn!(transfer_id = %transfer_id, "Transfer number still taken, giving up");
                    return Err(FundError::ConcurrentModification(from.id).into());
                }
                Err(err) => return Err(err.into()),
            }
        };

        txn.commit().await?;

        info!(
            transfer_id = %transfer.id,
            transfer_number = %transfer.transfer_number,
            from_fund_source_id = %from.id,
            to_fund_source_id = %to.id,
            amount = %plan.amount,
            fee = %plan.fee,
            "Fund transfer completed"
        );
        Ok(TransferDetail {
            transfer,
            out_transaction,
            in_transaction,
        })
    }

    /// Finds a transfer by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<fund_transfers::Model>, FundRepoError> {
        Ok(fund_transfers::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Gets a transfer with both legs.
    ///
    /// # Errors
    ///
    /// Returns `TransferNotFound` if it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<TransferDetail, FundRepoError> {
        let transfer = self
            .find_by_id(id)
            .await?
            .ok_or(FundRepoError::Fund(FundError::TransferNotFound(id)))?;

        let legs = fund_transactions::Entity::find()
            .filter(
                fund_transactions::Column::Id
                    .is_in([transfer.out_transaction_id, transfer.in_transaction_id]),
            )
            .all(&self.db)
            .await?;

        let find_leg = |leg_id: Uuid| {
            legs.iter().find(|leg| leg.id == leg_id).cloned().ok_or_else(|| {
                FundRepoError::Fund(FundError::Internal(format!(
                    "transfer {id} is missing ledger entry {leg_id}"
                )))
            })
        };
        let out_transaction = find_leg(transfer.out_transaction_id)?;
        let in_transaction = find_leg(transfer.in_transaction_id)?;

        Ok(TransferDetail {
            transfer,
            out_transaction,
            in_transaction,
        })
    }

    /// Lists transfers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &TransferFilter,
        page: PageRequest,
    ) -> Result<PageResponse<fund_transfers::Model>, FundRepoError> {
        let mut query = fund_transfers::Entity::find();
        if let Some(from_id) = filter.from_fund_source_id {
            query = query.filter(fund_transfers::Column::FromFundSourceId.eq(from_id));
        }
        if let Some(to_id) = filter.to_fund_source_id {
            query = query.filter(fund_transfers::Column::ToFundSourceId.eq(to_id));
        }
        if let Some(status) = filter.status {
            query = query
                .filter(fund_transfers::Column::Status.eq(db_enums::TransferStatus::from(status)));
        }
        if let Some(from) = filter.from {
            query = query.filter(
                fund_transfers::Column::TransferDate.gte(DateTime::<FixedOffset>::from(from)),
            );
        }
        if let Some(to) = filter.to {
            query = query.filter(
                fund_transfers::Column::TransferDate.lte(DateTime::<FixedOffset>::from(to)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(fund_transfers::Column::TransferDate)
            .order_by_desc(fund_transfers::Column::TransferNumber)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(items, page, total))
    }
}

/// Issues the next transfer number for the day.
async fn next_number(
    txn: &DatabaseTransaction,
    date: chrono::NaiveDate,
) -> Result<String, FundRepoError> {
    let prefix = transfer_number_prefix(date);
    let issued: Vec<String> = fund_transfers::Entity::find()
        .select_only()
        .column(fund_transfers::Column::TransferNumber)
        .filter(fund_transfers::Column::TransferNumber.starts_with(&prefix))
        .into_tuple()
        .all(txn)
        .await?;
    Ok(next_transfer_number(date, issued.iter().map(String::as_str)))
}

