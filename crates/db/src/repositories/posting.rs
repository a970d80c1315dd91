//! Ledger write path shared by every balance-affecting operation.
//!
//! Callers open a database transaction, lock the fund row, plan the entry
//! with the core posting rules and hand it to [`append_entry`]. The entry
//! insert and the balance update either both commit or both roll back.

use chrono::{DateTime, FixedOffset};
use fundledger_core::fund::{FundError, Posting, ReferenceType};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use super::error::{FundRepoError, is_unique_violation};
use crate::entities::{fund_sources, fund_transactions};

/// Descriptive fields written alongside a ledger entry.
#[derive(Debug, Clone)]
pub(crate) struct EntryMeta {
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub description: String,
    pub transaction_date: DateTime<FixedOffset>,
    pub created_by: Option<Uuid>,
}

/// Reads a fund row for update.
///
/// On Postgres the row is locked until the transaction ends. Other backends
/// rely on the version check in [`append_entry`].
pub(crate) async fn lock_fund(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<fund_sources::Model, FundRepoError> {
    let mut query = fund_sources::Entity::find_by_id(id);
    if txn.get_database_backend() == DatabaseBackend::Postgres {
        query = query.lock_exclusive();
    }
    query
        .one(txn)
        .await?
        .ok_or(FundRepoError::Fund(FundError::FundSourceNotFound(id)))
}

/// Writes a planned entry and moves the fund's cached balance.
///
/// Fails with `ConcurrentModification` if another writer advanced the fund
/// since `fund` was read.
pub(crate) async fn append_entry(
    txn: &DatabaseTransaction,
    fund: &fund_sources::Model,
    posting: &Posting,
    meta: EntryMeta,
) -> Result<fund_transactions::Model, FundRepoError> {
    let now: DateTime<FixedOffset> = chrono::Utc::now().into();

    let entry = fund_transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        fund_source_id: Set(fund.id),
        transaction_type: Set(posting.transaction_type.into()),
        direction: Set(posting.direction.into()),
        amount: Set(posting.amount),
        running_balance: Set(posting.running.current_balance),
        sequence: Set(posting.running.sequence),
        reference_type: Set(meta.reference_type.map(Into::into)),
        reference_id: Set(meta.reference_id),
        description: Set(meta.description),
        transaction_date: Set(meta.transaction_date),
        created_by: Set(meta.created_by),
        created_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            FundRepoError::Fund(FundError::ConcurrentModification(fund.id))
        } else {
            FundRepoError::Database(err)
        }
    })?;

    let result = fund_sources::Entity::update_many()
        .col_expr(
            fund_sources::Column::CurrentBalance,
            Expr::value(posting.running.current_balance),
        )
        .col_expr(
            fund_sources::Column::Version,
            Expr::value(posting.running.sequence),
        )
        .col_expr(fund_sources::Column::UpdatedAt, Expr::value(now))
        .filter(fund_sources::Column::Id.eq(fund.id))
        .filter(fund_sources::Column::Version.eq(fund.version))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(FundError::ConcurrentModification(fund.id).into());
    }

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{Migrator, MigratorTrait};
    use crate::repositories::FundSourceRepository;
    use fundledger_core::fund::{FundSourceType, FundTransactionType, NewFundSource};
    use fundledger_shared::LedgerConfig;
    use rust_decimal_macros::dec;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection, PaginatorTrait, TransactionTrait};

    async fn setup() -> (DatabaseConnection, fund_sources::Model) {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let fund = FundSourceRepository::new(db.clone(), LedgerConfig::default())
            .create(
                NewFundSource {
                    name: "Register".to_string(),
                    code: "CASH-01".to_string(),
                    fund_type: FundSourceType::CashRegister,
                    branch_id: None,
                    opening_balance: dec!(1000),
                    currency: None,
                    bank_name: None,
                    account_number: None,
                    account_holder: None,
                    description: None,
                    is_default: false,
                    display_order: 0,
                },
                None,
            )
            .await
            .unwrap();
        (db, fund)
    }

    fn meta() -> EntryMeta {
        EntryMeta {
            reference_type: None,
            reference_id: None,
            description: "Manual deposit".to_string(),
            transaction_date: chrono::Utc::now().into(),
            created_by: None,
        }
    }

    fn deposit(fund: &fund_sources::Model) -> Posting {
        Posting::plan(&fund.balance_state(), FundTransactionType::Deposit, dec!(100)).unwrap()
    }

    async fn ledger_len(db: &DatabaseConnection, fund: &fund_sources::Model) -> u64 {
        fund_transactions::Entity::find()
            .filter(fund_transactions::Column::FundSourceId.eq(fund.id))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_advances_balance_and_version() {
        let (db, fund) = setup().await;

        let txn = db.begin().await.unwrap();
        let entry = append_entry(&txn, &fund, &deposit(&fund), meta()).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(entry.sequence, 2);
        assert_eq!(entry.running_balance, dec!(1100));
        let stored = fund_sources::Entity::find_by_id(fund.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.current_balance, dec!(1100));
    }

    #[tokio::test]
    async fn test_stale_read_loses_on_taken_sequence() {
        let (db, stale) = setup().await;

        let txn = db.begin().await.unwrap();
        append_entry(&txn, &stale, &deposit(&stale), meta()).await.unwrap();
        txn.commit().await.unwrap();

        let txn = db.begin().await.unwrap();
        let err = append_entry(&txn, &stale, &deposit(&stale), meta())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FundRepoError::Fund(FundError::ConcurrentModification(id)) if id == stale.id
        ));
        txn.rollback().await.unwrap();

        assert_eq!(ledger_len(&db, &stale).await, 2);
    }

    #[tokio::test]
    async fn test_stale_version_rejected_and_entry_rolled_back() {
        let (db, stale) = setup().await;
        fund_sources::Entity::update_many()
            .col_expr(fund_sources::Column::Version, Expr::value(5_i64))
            .filter(fund_sources::Column::Id.eq(stale.id))
            .exec(&db)
            .await
            .unwrap();

        let txn = db.begin().await.unwrap();
        let err = append_entry(&txn, &stale, &deposit(&stale), meta())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FundRepoError::Fund(FundError::ConcurrentModification(_))
        ));
        txn.rollback().await.unwrap();

        assert_eq!(ledger_len(&db, &stale).await, 1);
        let stored = fund_sources::Entity::find_by_id(stale.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.current_balance, dec!(1000));
        assert_eq!(stored.version, 5);
    }

    #[tokio::test]
    async fn test_lock_missing_fund() {
        let (db, _) = setup().await;
        let txn = db.begin().await.unwrap();
        let missing = Uuid::now_v7();
        let err = lock_fund(&txn, missing).await.unwrap_err();
        assert!(matches!(
            err,
            FundRepoError::Fund(FundError::FundSourceNotFound(id)) if id == missing
        ));
    }
}
