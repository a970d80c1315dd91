//! Deposit, withdrawal and adjustment tests.

mod common;

use chrono::{Duration, Utc};
use common::{actor, create_fund, setup};
use fundledger_core::fund::{FundError, FundTransactionType, ReferenceType};
use fundledger_db::entities::{fund_transactions, sea_orm_active_enums as db_enums};
use fundledger_db::repositories::{
    AdjustBalanceInput, RecordTransactionInput, RecordedTransaction, TransactionFilter,
};
use fundledger_db::{FundRepoError, FundSourceRepository, FundTransactionRepository};
use fundledger_shared::types::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

fn manual(fund_source_id: Uuid, kind: FundTransactionType, amount: Decimal) -> RecordTransactionInput {
    RecordTransactionInput {
        fund_source_id,
        transaction_type: kind,
        amount,
        description: None,
        reference_type: None,
        reference_id: None,
        transaction_date: None,
        created_by: Some(actor()),
    }
}

async fn post(
    db: &DatabaseConnection,
    fund_source_id: Uuid,
    kind: FundTransactionType,
    amount: Decimal,
) -> Result<RecordedTransaction, FundRepoError> {
    FundTransactionRepository::new(db.clone())
        .record(manual(fund_source_id, kind, amount))
        .await
}

async fn ledger_len(db: &DatabaseConnection, fund_source_id: Uuid) -> u64 {
    fund_transactions::Entity::find()
        .filter(fund_transactions::Column::FundSourceId.eq(fund_source_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_deposit_then_withdrawal() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(10000)).await;

    let deposit = post(&db, fund.id, FundTransactionType::Deposit, dec!(2500))
        .await
        .unwrap();
    assert_eq!(deposit.fund_source.current_balance, dec!(12500));
    assert_eq!(deposit.transaction.running_balance, dec!(12500));
    assert_eq!(deposit.transaction.direction, db_enums::FlowDirection::Inflow);
    assert_eq!(deposit.transaction.sequence, 2);
    assert_eq!(deposit.transaction.description, "Manual deposit");

    let withdrawal = post(&db, fund.id, FundTransactionType::Withdrawal, dec!(12500))
        .await
        .unwrap();
    assert_eq!(withdrawal.fund_source.current_balance, Decimal::ZERO);
    assert_eq!(withdrawal.transaction.running_balance, Decimal::ZERO);
    assert_eq!(withdrawal.transaction.direction, db_enums::FlowDirection::Outflow);
    assert_eq!(withdrawal.transaction.sequence, 3);
    assert_eq!(withdrawal.fund_source.version, 3);
    assert_eq!(withdrawal.transaction.description, "Manual withdrawal");
}

#[tokio::test]
async fn test_reference_and_description_are_kept() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(100)).await;
    let sale = Uuid::new_v4();

    let mut input = manual(fund.id, FundTransactionType::Deposit, dec!(50));
    input.reference_type = Some(ReferenceType::PosSale);
    input.reference_id = Some(sale);
    input.description = Some("  Receipt 1042 ".to_string());
    let recorded = FundTransactionRepository::new(db.clone())
        .record(input)
        .await
        .unwrap();

    assert_eq!(
        recorded.transaction.reference_type,
        Some(db_enums::ReferenceType::PosSale)
    );
    assert_eq!(recorded.transaction.reference_id, Some(sale));
    assert_eq!(recorded.transaction.description, "Receipt 1042");
    assert_eq!(recorded.transaction.created_by, Some(actor()));
}

#[tokio::test]
async fn test_withdrawal_beyond_balance_changes_nothing() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(300)).await;

    let err = post(&db, fund.id, FundTransactionType::Withdrawal, dec!(300.50))
        .await
        .unwrap_err();
    match err {
        FundRepoError::Fund(FundError::InsufficientBalance { available, required }) => {
            assert_eq!(available, dec!(300));
            assert_eq!(required, dec!(300.50));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let reloaded = FundSourceRepository::new(db.clone(), common::ledger_config())
        .get(fund.id)
        .await
        .unwrap();
    assert_eq!(reloaded.current_balance, dec!(300));
    assert_eq!(reloaded.version, 1);
    assert_eq!(ledger_len(&db, fund.id).await, 1);
}

#[tokio::test]
async fn test_invalid_amounts_and_types_rejected() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(300)).await;

    for amount in [Decimal::ZERO, dec!(-5)] {
        assert!(matches!(
            post(&db, fund.id, FundTransactionType::Deposit, amount).await,
            Err(FundRepoError::Fund(FundError::NonPositiveAmount))
        ));
    }
    for kind in [
        FundTransactionType::Adjustment,
        FundTransactionType::TransferIn,
        FundTransactionType::OpeningBalance,
    ] {
        assert!(matches!(
            post(&db, fund.id, kind, dec!(1)).await,
            Err(FundRepoError::Fund(FundError::UnsupportedTransactionType(_)))
        ));
    }
    assert_eq!(ledger_len(&db, fund.id).await, 1);
}

#[tokio::test]
async fn test_posting_to_missing_fund() {
    let db = setup().await;
    let missing = Uuid::new_v4();
    assert!(matches!(
        post(&db, missing, FundTransactionType::Deposit, dec!(1)).await,
        Err(FundRepoError::Fund(FundError::FundSourceNotFound(id))) if id == missing
    ));
}

#[tokio::test]
async fn test_adjust_requires_reason() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(1000)).await;
    let repo = FundTransactionRepository::new(db.clone());

    for reason in [None, Some("   ".to_string())] {
        let err = repo
            .adjust(AdjustBalanceInput {
                fund_source_id: fund.id,
                new_balance: dec!(900),
                reason,
                created_by: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FundRepoError::Fund(FundError::MissingField("reason"))));
    }
    assert_eq!(ledger_len(&db, fund.id).await, 1);
}

#[tokio::test]
async fn test_adjust_down_and_up() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(1000)).await;
    let repo = FundTransactionRepository::new(db.clone());

    let down = repo
        .adjust(AdjustBalanceInput {
            fund_source_id: fund.id,
            new_balance: dec!(950),
            reason: Some("Cash count short".to_string()),
            created_by: Some(actor()),
        })
        .await
        .unwrap();
    assert_eq!(down.fund_source.current_balance, dec!(950));
    assert_eq!(down.transaction.amount, dec!(50));
    assert_eq!(down.transaction.direction, db_enums::FlowDirection::Outflow);
    assert_eq!(
        down.transaction.transaction_type,
        db_enums::FundTransactionType::Adjustment
    );
    assert_eq!(
        down.transaction.reference_type,
        Some(db_enums::ReferenceType::Adjustment)
    );
    assert_eq!(down.transaction.description, "Balance adjustment: Cash count short");

    let up = repo
        .adjust(AdjustBalanceInput {
            fund_source_id: fund.id,
            new_balance: dec!(1200.50),
            reason: Some("Found envelope".to_string()),
            created_by: None,
        })
        .await
        .unwrap();
    assert_eq!(up.fund_source.current_balance, dec!(1200.50));
    assert_eq!(up.transaction.amount, dec!(250.50));
    assert_eq!(up.transaction.direction, db_enums::FlowDirection::Inflow);
    assert_eq!(up.transaction.running_balance, dec!(1200.50));
}

#[tokio::test]
async fn test_adjust_to_same_or_negative_balance_rejected() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(1000)).await;
    let repo = FundTransactionRepository::new(db.clone());

    let same = repo
        .adjust(AdjustBalanceInput {
            fund_source_id: fund.id,
            new_balance: dec!(1000),
            reason: Some("Recount".to_string()),
            created_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(same, FundRepoError::Fund(FundError::NoBalanceChange(_))));

    let negative = repo
        .adjust(AdjustBalanceInput {
            fund_source_id: fund.id,
            new_balance: dec!(-1),
            reason: Some("Recount".to_string()),
            created_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(negative, FundRepoError::Fund(FundError::NegativeValue(_))));
    assert_eq!(ledger_len(&db, fund.id).await, 1);
}

#[tokio::test]
async fn test_history_paginates_newest_first() {
    let db = setup().await;
    let fund = create_fund(&db, "CASH-01", dec!(100)).await;
    for amount in [dec!(10), dec!(20), dec!(30)] {
        post(&db, fund.id, FundTransactionType::Deposit, amount)
            .await
            .unwrap();
    }
    post(&db, fund.id, FundTransactionType::Withdrawal, dec!(5))
        .await
        .unwrap();

    let repo = FundTransactionRepository::new(db.clone());
    let first = repo
        .history(fund.id, &TransactionFilter::default(), PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(first.meta.total, 5);
    assert_eq!(first.meta.total_pages, 3);
    let sequences: Vec<i64> = first.data.iter().map(|t| t.sequence).collect();
    assert_eq!(sequences, vec![5, 4]);

    let last = repo
        .history(fund.id, &TransactionFilter::default(), PageRequest::new(Some(3), Some(2)))
        .await
        .unwrap();
    assert_eq!(last.data.len(), 1);
    assert_eq!(
        last.data[0].transaction_type,
        db_enums::FundTransactionType::OpeningBalance
    );

    let deposits = repo
        .history(
            fund.id,
            &TransactionFilter {
                transaction_type: Some(FundTransactionType::Deposit),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(deposits.meta.total, 3);

    let future = repo
        .history(
            fund.id,
            &TransactionFilter {
                from: Some(Utc::now() + Duration::days(1)),
                ..TransactionFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert!(future.data.is_empty());
}

#[tokio::test]
async fn test_history_of_missing_fund() {
    let db = setup().await;
    let result = FundTransactionRepository::new(db)
        .history(Uuid::new_v4(), &TransactionFilter::default(), PageRequest::default())
        .await;
    assert!(matches!(
        result,
        Err(FundRepoError::Fund(FundError::FundSourceNotFound(_)))
    ));
}

#[tokio::test]
async fn test_recent_skips_closed_funds() {
    let db = setup().await;
    let open = create_fund(&db, "OPEN", dec!(100)).await;
    let closed = create_fund(&db, "SHUT", dec!(100)).await;
    post(&db, open.id, FundTransactionType::Deposit, dec!(1))
        .await
        .unwrap();
    FundSourceRepository::new(db.clone(), common::ledger_config())
        .delete(closed.id, None)
        .await
        .unwrap();

    let recent = FundTransactionRepository::new(db.clone())
        .recent(None, 10)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|r| r.fund_source_code == "OPEN"));

    let limited = FundTransactionRepository::new(db)
        .recent(None, 1)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}
