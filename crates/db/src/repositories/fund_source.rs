//! Fund source repository.
//!
//! Registry of fund sources: creation with the opening ledger entry, lookup,
//! filtered listing, attribute updates, soft/hard deletion and the summary
//! views used by the dashboard.

use chrono::{DateTime, FixedOffset, Utc};
use fundledger_core::fund::{
    FundError, FundSourceChanges, FundSourceType, FundStatus, FundSummary, LowBalanceAlert,
    NewFundSource, Posting, low_balance_alerts, summarize, validate_changes,
    validate_new_fund_source,
};
use fundledger_shared::LedgerConfig;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::error::{FundRepoError, is_unique_violation};
use super::posting::{EntryMeta, append_entry, lock_fund};
use crate::entities::{fund_sources, fund_transactions, sea_orm_active_enums as db_enums};

/// Description written on the opening ledger entry.
pub const OPENING_BALANCE_DESCRIPTION: &str = "Opening balance";

/// Filter options for listing fund sources.
#[derive(Debug, Clone, Default)]
pub struct FundSourceFilter {
    /// Only funds assigned to this branch.
    pub branch_id: Option<Uuid>,
    /// Restrict to one fund type.
    pub fund_type: Option<FundSourceType>,
    /// Restrict to one status. Closed funds are hidden unless asked for.
    pub status: Option<FundStatus>,
    /// Case-insensitive match on name, code, bank name or account number.
    pub search: Option<String>,
}

/// Result of deleting a fund source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The fund had ledger history and was closed instead.
    Closed(fund_sources::Model),
    /// The fund had no history and was removed.
    Deleted,
}

/// Fund source repository for registry operations.
#[derive(Debug, Clone)]
pub struct FundSourceRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl FundSourceRepository {
    /// Creates a new fund source repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Creates a fund source and stamps its opening balance entry.
    ///
    /// A positive opening balance produces exactly one `OPENING_BALANCE`
    /// entry with `running_balance == opening_balance`; a zero opening
    /// balance leaves the ledger empty.
    ///
    /// # Errors
    ///
    /// - Validation errors for malformed input
    /// - `DuplicateCode` if the code is taken
    /// - Database errors
    pub async fn create(
        &self,
        input: NewFundSource,
        created_by: Option<Uuid>,
    ) -> Result<fund_sources::Model, FundRepoError> {
        let input = validate_new_fund_source(input, &self.config.default_currency)?;
        let now: DateTime<FixedOffset> = Utc::now().into();

        let txn = self.db.begin().await?;
        ensure_code_available(&txn, &input.code, None).await?;

        let opening = Posting::opening(input.opening_balance);
        let id = Uuid::now_v7();
        let code = input.code.clone();
        let (branch_id, is_default) = (input.branch_id, input.is_default);
        let fund = fund_sources::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            code: Set(input.code),
            fund_type: Set(input.fund_type.into()),
            branch_id: Set(input.branch_id),
            opening_balance: Set(input.opening_balance),
            current_balance: Set(Decimal::ZERO),
            currency: Set(input
                .currency
                .unwrap_or_else(|| self.config.default_currency.clone())),
            bank_name: Set(input.bank_name),
            account_number: Set(input.account_number),
            account_holder: Set(input.account_holder),
            description: Set(input.description),
            is_default: Set(input.is_default),
            display_order: Set(input.display_order),
            status: Set(db_enums::FundStatus::Active),
            version: Set(0),
            created_by: Set(created_by),
            updated_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                FundRepoError::Fund(FundError::DuplicateCode(code.clone()))
            } else {
                FundRepoError::Database(err)
            }
        })?;

        if is_default {
            clear_other_defaults(&txn, branch_id, id).await?;
        }

        let fund = match opening {
            Some(posting) => {
                append_entry(
                    &txn,
                    &fund,
                    &posting,
                    EntryMeta {
                        reference_type: None,
                        reference_id: None,
                        description: OPENING_BALANCE_DESCRIPTION.to_string(),
                        transaction_date: now,
                        created_by,
                    },
                )
                .await?;
                lock_fund(&txn, id).await?
            }
            None => fund,
        };

        txn.commit().await?;

        info!(
            fund_source_id = %fund.id,
            code = %fund.code,
            opening_balance = %fund.opening_balance,
            "Fund source created"
        );
        Ok(fund)
    }

    /// Finds a fund source by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<fund_sources::Model>, FundRepoError> {
        Ok(fund_sources::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Gets a fund source by ID.
    ///
    /// # Errors
    ///
    /// Returns `FundSourceNotFound` if it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<fund_sources::Model, FundRepoError> {
        self.find_by_id(id)
            .await?
            .ok_or(FundRepoError::Fund(FundError::FundSourceNotFound(id)))
    }

    /// Finds a fund source by its code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<fund_sources::Model>, FundRepoError> {
        Ok(fund_sources::Entity::find()
            .filter(fund_sources::Column::Code.eq(code.trim()))
            .one(&self.db)
            .await?)
    }

    /// Lists fund sources ordered by display order, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &FundSourceFilter,
    ) -> Result<Vec<fund_sources::Model>, FundRepoError> {
        let mut query = fund_sources::Entity::find();

        if let Some(branch_id) = filter.branch_id {
            query = query.filter(fund_sources::Column::BranchId.eq(branch_id));
        }
        if let Some(fund_type) = filter.fund_type {
            query = query.filter(
                fund_sources::Column::FundType.eq(db_enums::FundSourceType::from(fund_type)),
            );
        }
        query = match filter.status {
            Some(status) => {
                query.filter(fund_sources::Column::Status.eq(db_enums::FundStatus::from(status)))
            }
            None => query.filter(fund_sources::Column::Status.ne(db_enums::FundStatus::Closed)),
        };
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(lower_like(fund_sources::Column::Name, &pattern))
                    .add(lower_like(fund_sources::Column::Code, &pattern))
                    .add(lower_like(fund_sources::Column::BankName, &pattern))
                    .add(lower_like(fund_sources::Column::AccountNumber, &pattern)),
            );
        }

        Ok(query
            .order_by_asc(fund_sources::Column::DisplayOrder)
            .order_by_asc(fund_sources::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Updates mutable attributes of a fund source.
    ///
    /// Balances are never touched here.
    ///
    /// # Errors
    ///
    /// - `FundSourceNotFound` if the fund does not exist
    /// - `DuplicateCode` if a new code is taken
    /// - Validation errors for malformed changes
    pub async fn update(
        &self,
        id: Uuid,
        changes: FundSourceChanges,
        updated_by: Option<Uuid>,
    ) -> Result<fund_sources::Model, FundRepoError> {
        let changes = validate_changes(changes)?;

        let txn = self.db.begin().await?;
        let existing = fund_sources::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(FundRepoError::Fund(FundError::FundSourceNotFound(id)))?;

        if let Some(code) = changes.code.as_deref().filter(|code| *code != existing.code) {
            ensure_code_available(&txn, code, Some(id)).await?;
        }

        let new_code = changes.code.clone();
        let default_scope = changes
            .is_default
            .filter(|is_default| *is_default)
            .map(|_| changes.branch_id.unwrap_or(existing.branch_id));
        let mut active = existing.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(code) = changes.code {
            active.code = Set(code);
        }
        if let Some(fund_type) = changes.fund_type {
            active.fund_type = Set(fund_type.into());
        }
        if let Some(branch_id) = changes.branch_id {
            active.branch_id = Set(branch_id);
        }
        if let Some(bank_name) = changes.bank_name {
            active.bank_name = Set(bank_name);
        }
        if let Some(account_number) = changes.account_number {
            active.account_number = Set(account_number);
        }
        if let Some(account_holder) = changes.account_holder {
            active.account_holder = Set(account_holder);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(currency) = changes.currency {
            active.currency = Set(currency);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.into());
        }
        if let Some(is_default) = changes.is_default {
            active.is_default = Set(is_default);
        }
        if let Some(display_order) = changes.display_order {
            active.display_order = Set(display_order);
        }
        active.updated_by = Set(updated_by);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await.map_err(|err| {
            if is_unique_violation(&err) {
                FundRepoError::Fund(FundError::DuplicateCode(new_code.unwrap_or_default()))
            } else {
                FundRepoError::Database(err)
            }
        })?;
        if let Some(branch_id) = default_scope {
            clear_other_defaults(&txn, branch_id, id).await?;
        }
        txn.commit().await?;

        info!(fund_source_id = %id, "Fund source updated");
        Ok(updated)
    }

    /// Deletes a fund source.
    ///
    /// Funds with ledger history are closed and kept; funds without any
    /// history are removed.
    ///
    /// # Errors
    ///
    /// Returns `FundSourceNotFound` if it does not exist.
    pub async fn delete(
        &self,
        id: Uuid,
        deleted_by: Option<Uuid>,
    ) -> Result<DeleteOutcome, FundRepoError> {
        let txn = self.db.begin().await?;
        let fund = lock_fund(&txn, id).await?;

        let history = fund_transactions::Entity::find()
            .filter(fund_transactions::Column::FundSourceId.eq(id))
            .count(&txn)
            .await?;

        let outcome = if history == 0 {
            fund_sources::Entity::delete_by_id(id).exec(&txn).await?;
            info!(fund_source_id = %id, "Fund source deleted");
            DeleteOutcome::Deleted
        } else {
            let mut active = fund.into_active_model();
            active.status = Set(db_enums::FundStatus::Closed);
            active.updated_by = Set(deleted_by);
            active.updated_at = Set(Utc::now().into());
            let closed = active.update(&txn).await?;
            info!(fund_source_id = %id, history, "Fund source closed");
            DeleteOutcome::Closed(closed)
        };

        txn.commit().await?;
        Ok(outcome)
    }

    /// Non-closed funds usable by a branch: its own funds plus company-wide
    /// ones. Without a branch only company-wide funds are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_branch(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<fund_sources::Model>, FundRepoError> {
        let scope = match branch_id {
            Some(branch_id) => branch_scope(branch_id),
            None => Condition::all().add(fund_sources::Column::BranchId.is_null()),
        };
        Ok(fund_sources::Entity::find()
            .filter(scope)
            .filter(fund_sources::Column::Status.ne(db_enums::FundStatus::Closed))
            .order_by_asc(fund_sources::Column::DisplayOrder)
            .order_by_asc(fund_sources::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Finds the default fund for a branch.
    ///
    /// Only active default funds qualify. A branch-specific default wins over
    /// a company-wide one; ties go to display order, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_default(
        &self,
        branch_id: Option<Uuid>,
        fund_type: Option<FundSourceType>,
    ) -> Result<Option<fund_sources::Model>, FundRepoError> {
        let mut query = fund_sources::Entity::find()
            .filter(fund_sources::Column::IsDefault.eq(true))
            .filter(fund_sources::Column::Status.eq(db_enums::FundStatus::Active));
        if let Some(branch_id) = branch_id {
            query = query.filter(branch_scope(branch_id));
        }
        if let Some(fund_type) = fund_type {
            query = query.filter(
                fund_sources::Column::FundType.eq(db_enums::FundSourceType::from(fund_type)),
            );
        }

        let mut candidates = query.all(&self.db).await?;
        candidates.sort_by(|a, b| {
            b.branch_id
                .is_some()
                .cmp(&a.branch_id.is_some())
                .then_with(|| a.display_order.cmp(&b.display_order))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(candidates.into_iter().next())
    }

    /// Returns true if the fund can cover a debit of `amount`.
    ///
    /// # Errors
    ///
    /// Returns `FundSourceNotFound` if it does not exist.
    pub async fn has_sufficient_balance(
        &self,
        id: Uuid,
        amount: Decimal,
    ) -> Result<bool, FundRepoError> {
        let fund = self.get(id).await?;
        Ok(fund.balance_state().has_sufficient_balance(amount))
    }

    /// Summarizes non-closed funds, optionally for one branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary(&self, branch_id: Option<Uuid>) -> Result<FundSummary, FundRepoError> {
        let funds = self.open_funds(branch_id).await?;
        let snapshots: Vec<_> = funds.iter().map(fund_sources::Model::snapshot).collect();
        Ok(summarize(&snapshots))
    }

    /// Active funds below the configured low-balance threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn low_balance_alerts(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<LowBalanceAlert>, FundRepoError> {
        let funds = self.open_funds(branch_id).await?;
        let snapshots: Vec<_> = funds.iter().map(fund_sources::Model::snapshot).collect();
        Ok(low_balance_alerts(
            &snapshots,
            self.config.low_balance_threshold,
        ))
    }

    /// Non-closed funds of a branch including company-wide ones, or every
    /// non-closed fund without a branch.
    async fn open_funds(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<Vec<fund_sources::Model>, FundRepoError> {
        match branch_id {
            Some(_) => self.find_by_branch(branch_id).await,
            None => self.list(&FundSourceFilter::default()).await,
        }
    }
}

/// Funds belonging to `branch_id` plus company-wide funds.
pub(crate) fn branch_scope(branch_id: Uuid) -> Condition {
    Condition::any()
        .add(fund_sources::Column::BranchId.eq(branch_id))
        .add(fund_sources::Column::BranchId.is_null())
}

/// Unsets the default flag on every other fund sharing `branch_id`.
async fn clear_other_defaults(
    txn: &DatabaseTransaction,
    branch_id: Option<Uuid>,
    except: Uuid,
) -> Result<(), FundRepoError> {
    let scope = match branch_id {
        Some(branch_id) => fund_sources::Column::BranchId.eq(branch_id),
        None => fund_sources::Column::BranchId.is_null(),
    };
    let cleared = fund_sources::Entity::update_many()
        .col_expr(fund_sources::Column::IsDefault, Expr::value(false))
        .filter(fund_sources::Column::IsDefault.eq(true))
        .filter(scope)
        .filter(fund_sources::Column::Id.ne(except))
        .exec(txn)
        .await?;
    if cleared.rows_affected > 0 {
        info!(
            fund_source_id = %except,
            cleared = cleared.rows_affected,
            "Default fund source replaced"
        );
    }
    Ok(())
}

fn lower_like(column: fund_sources::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

async fn ensure_code_available(
    txn: &DatabaseTransaction,
    code: &str,
    except: Option<Uuid>,
) -> Result<(), FundRepoError> {
    let mut query = fund_sources::Entity::find().filter(fund_sources::Column::Code.eq(code));
    if let Some(id) = except {
        query = query.filter(fund_sources::Column::Id.ne(id));
    }
    if query.one(txn).await?.is_some() {
        return Err(FundError::DuplicateCode(code.to_string()).into());
    }
    Ok(())
}
