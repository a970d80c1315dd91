//! Fund-to-fund transfer tests.

mod common;

use chrono::{TimeZone, Utc};
use common::{actor, create_fund, ledger_config, setup};
use fundledger_core::fund::{FundError, TransferStatus};
use fundledger_db::entities::{fund_transactions, fund_transfers, sea_orm_active_enums as db_enums};
use fundledger_db::repositories::{TransferFilter, TransferInput};
use fundledger_db::{FundRepoError, FundSourceRepository, FundTransferRepository};
use fundledger_shared::types::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

fn transfer(from: Uuid, to: Uuid, amount: Decimal, fee: Decimal) -> TransferInput {
    TransferInput {
        from_fund_source_id: from,
        to_fund_source_id: to,
        amount,
        transfer_fee: fee,
        description: None,
        transfer_date: Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()),
        created_by: Some(actor()),
    }
}

#[tokio::test]
async fn test_transfer_without_fee() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(10000)).await;
    let bank = create_fund(&db, "BANK", dec!(2000)).await;
    let funds = FundSourceRepository::new(db.clone(), ledger_config());

    let detail = FundTransferRepository::new(db.clone())
        .transfer(transfer(cash.id, bank.id, dec!(5000), Decimal::ZERO))
        .await
        .unwrap();

    assert_eq!(detail.transfer.transfer_number, "TRF-20260115-0001");
    assert_eq!(detail.transfer.net_amount, dec!(5000));
    assert_eq!(detail.transfer.status, db_enums::TransferStatus::Completed);
    assert_eq!(funds.get(cash.id).await.unwrap().current_balance, dec!(5000));
    assert_eq!(funds.get(bank.id).await.unwrap().current_balance, dec!(7000));

    let out = &detail.out_transaction;
    assert_eq!(out.transaction_type, db_enums::FundTransactionType::TransferOut);
    assert_eq!(out.amount, dec!(5000));
    assert_eq!(out.running_balance, dec!(5000));
    assert_eq!(out.reference_type, Some(db_enums::ReferenceType::Transfer));
    assert_eq!(out.reference_id, Some(detail.transfer.id));
    assert_eq!(out.description, "Transfer to Fund BANK");

    let incoming = &detail.in_transaction;
    assert_eq!(incoming.transaction_type, db_enums::FundTransactionType::TransferIn);
    assert_eq!(incoming.amount, dec!(5000));
    assert_eq!(incoming.running_balance, dec!(7000));
    assert_eq!(incoming.reference_id, Some(detail.transfer.id));
    assert_eq!(incoming.description, "Transfer from Fund CASH");
}

#[tokio::test]
async fn test_transfer_fee_charged_to_source() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(10000)).await;
    let bank = create_fund(&db, "BANK", dec!(2000)).await;
    let funds = FundSourceRepository::new(db.clone(), ledger_config());

    let mut input = transfer(cash.id, bank.id, dec!(5000), dec!(50));
    input.description = Some("Weekly deposit".to_string());
    let detail = FundTransferRepository::new(db.clone())
        .transfer(input)
        .await
        .unwrap();

    assert_eq!(detail.transfer.amount, dec!(5000));
    assert_eq!(detail.transfer.transfer_fee, dec!(50));
    assert_eq!(detail.transfer.net_amount, dec!(4950));
    assert_eq!(detail.transfer.description.as_deref(), Some("Weekly deposit"));
    assert_eq!(detail.out_transaction.amount, dec!(5050));
    assert_eq!(detail.in_transaction.amount, dec!(4950));
    assert_eq!(
        detail.out_transaction.description,
        "Transfer to Fund BANK (incl. fee 50) - Weekly deposit"
    );
    assert_eq!(
        detail.in_transaction.description,
        "Transfer from Fund CASH - Weekly deposit"
    );

    let cash_after = funds.get(cash.id).await.unwrap();
    let bank_after = funds.get(bank.id).await.unwrap();
    assert_eq!(cash_after.current_balance, dec!(4950));
    assert_eq!(bank_after.current_balance, dec!(6950));
    assert_eq!(
        cash_after.current_balance + bank_after.current_balance,
        dec!(12000) - dec!(50) * dec!(2)
    );
}

#[tokio::test]
async fn test_transfer_to_same_fund_rejected() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;

    let err = FundTransferRepository::new(db.clone())
        .transfer(transfer(cash.id, cash.id, dec!(10), Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, FundRepoError::Fund(FundError::SameFundSource)));
    assert_eq!(fund_transactions::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(fund_transfers::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_transfer_beyond_balance_writes_nothing() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;
    let bank = create_fund(&db, "BANK", dec!(0)).await;
    let funds = FundSourceRepository::new(db.clone(), ledger_config());

    // The fee pushes the debit past the balance.
    let err = FundTransferRepository::new(db.clone())
        .transfer(transfer(cash.id, bank.id, dec!(1000), dec!(10)))
        .await
        .unwrap_err();
    match err {
        FundRepoError::Fund(FundError::InsufficientBalance { available, required }) => {
            assert_eq!(available, dec!(1000));
            assert_eq!(required, dec!(1010));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(funds.get(cash.id).await.unwrap().current_balance, dec!(1000));
    assert_eq!(funds.get(bank.id).await.unwrap().current_balance, Decimal::ZERO);
    assert_eq!(fund_transactions::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(fund_transfers::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_fee_must_be_below_amount() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;
    let bank = create_fund(&db, "BANK", dec!(0)).await;

    let err = FundTransferRepository::new(db.clone())
        .transfer(transfer(cash.id, bank.id, dec!(10), dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FundRepoError::Fund(FundError::FeeNotBelowAmount { .. })
    ));
}

#[tokio::test]
async fn test_transfer_to_missing_fund() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;
    let missing = Uuid::new_v4();

    let err = FundTransferRepository::new(db.clone())
        .transfer(transfer(cash.id, missing, dec!(10), Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FundRepoError::Fund(FundError::FundSourceNotFound(id)) if id == missing
    ));
}

#[tokio::test]
async fn test_transfer_numbers_increment_per_day() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;
    let bank = create_fund(&db, "BANK", dec!(1000)).await;
    let repo = FundTransferRepository::new(db.clone());

    let first = repo
        .transfer(transfer(cash.id, bank.id, dec!(100), Decimal::ZERO))
        .await
        .unwrap();
    let second = repo
        .transfer(transfer(bank.id, cash.id, dec!(50), Decimal::ZERO))
        .await
        .unwrap();
    let mut next_day = transfer(cash.id, bank.id, dec!(25), Decimal::ZERO);
    next_day.transfer_date = Some(Utc.with_ymd_and_hms(2026, 1, 16, 8, 0, 0).unwrap());
    let third = repo.transfer(next_day).await.unwrap();

    assert_eq!(first.transfer.transfer_number, "TRF-20260115-0001");
    assert_eq!(second.transfer.transfer_number, "TRF-20260115-0002");
    assert_eq!(third.transfer.transfer_number, "TRF-20260116-0001");
}

#[tokio::test]
async fn test_transfer_numbers_continue_past_9999() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;
    let bank = create_fund(&db, "BANK", dec!(1000)).await;
    let repo = FundTransferRepository::new(db.clone());

    let first = repo
        .transfer(transfer(cash.id, bank.id, dec!(100), Decimal::ZERO))
        .await
        .unwrap();
    fund_transfers::Entity::update_many()
        .col_expr(
            fund_transfers::Column::TransferNumber,
            Expr::value("TRF-20260115-9999"),
        )
        .filter(fund_transfers::Column::Id.eq(first.transfer.id))
        .exec(&db)
        .await
        .unwrap();

    let second = repo
        .transfer(transfer(bank.id, cash.id, dec!(50), Decimal::ZERO))
        .await
        .unwrap();
    let third = repo
        .transfer(transfer(cash.id, bank.id, dec!(25), Decimal::ZERO))
        .await
        .unwrap();

    assert_eq!(second.transfer.transfer_number, "TRF-20260115-10000");
    assert_eq!(third.transfer.transfer_number, "TRF-20260115-10001");
    assert_eq!(fund_transfers::Entity::find().count(&db).await.unwrap(), 3);
}

#[tokio::test]
async fn test_get_and_list_transfers() {
    let db = setup().await;
    let cash = create_fund(&db, "CASH", dec!(1000)).await;
    let bank = create_fund(&db, "BANK", dec!(1000)).await;
    let repo = FundTransferRepository::new(db.clone());

    let sent = repo
        .transfer(transfer(cash.id, bank.id, dec!(100), dec!(5)))
        .await
        .unwrap();
    repo.transfer(transfer(bank.id, cash.id, dec!(40), Decimal::ZERO))
        .await
        .unwrap();

    let fetched = repo.get(sent.transfer.id).await.unwrap();
    assert_eq!(fetched.transfer.transfer_number, sent.transfer.transfer_number);
    assert_eq!(fetched.out_transaction.id, sent.out_transaction.id);
    assert_eq!(fetched.in_transaction.id, sent.in_transaction.id);
    assert_eq!(fetched.out_transaction.amount, dec!(105));
    assert_eq!(fetched.in_transaction.amount, dec!(95));

    let all = repo
        .list(&TransferFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.meta.total, 2);
    assert_eq!(all.data[0].transfer_number, "TRF-20260115-0002");

    let outgoing = repo
        .list(
            &TransferFilter {
                from_fund_source_id: Some(cash.id),
                status: Some(TransferStatus::Completed),
                ..TransferFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(outgoing.meta.total, 1);
    assert_eq!(outgoing.data[0].id, sent.transfer.id);

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.get(missing).await,
        Err(FundRepoError::Fund(FundError::TransferNotFound(id))) if id == missing
    ));
}
