//! Fund ledger schema.
//!
//! Creates the fund sources, their append-only transaction ledger and the
//! transfer records linking two ledger legs.

use fundledger_shared::types::{MONEY_PRECISION, MONEY_SCALE};
use sea_orm::DatabaseBackend;
use sea_orm_migration::prelude::*;

/// SQLite rejects decimal columns wider than this.
const SQLITE_MONEY_PRECISION: u32 = 16;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FundSources::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FundSources::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FundSources::Name).string_len(100).not_null())
                    .col(ColumnDef::new(FundSources::Code).string_len(50).not_null())
                    .col(ColumnDef::new(FundSources::FundType).string_len(20).not_null())
                    .col(ColumnDef::new(FundSources::BranchId).uuid().null())
                    .col(
                        money(manager, FundSources::OpeningBalance)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        money(manager, FundSources::CurrentBalance)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FundSources::Currency)
                            .string_len(3)
                            .not_null()
                            .default("PHP"),
                    )
                    .col(ColumnDef::new(FundSources::BankName).string_len(100).null())
                    .col(ColumnDef::new(FundSources::AccountNumber).string_len(50).null())
                    .col(ColumnDef::new(FundSources::AccountHolder).string_len(100).null())
                    .col(ColumnDef::new(FundSources::Description).text().null())
                    .col(
                        ColumnDef::new(FundSources::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FundSources::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FundSources::Status)
                            .string_len(10)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(FundSources::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FundSources::CreatedBy).uuid().null())
                    .col(ColumnDef::new(FundSources::UpdatedBy).uuid().null())
                    .col(
                        ColumnDef::new(FundSources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundSources::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_fund_sources_code")
                    .table(FundSources::Table)
                    .col(FundSources::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fund_sources_branch")
                    .table(FundSources::Table)
                    .col(FundSources::BranchId)
                    .col(FundSources::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FundTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FundTransactions::FundSourceId).uuid().not_null())
                    .col(
                        ColumnDef::new(FundTransactions::TransactionType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundTransactions::Direction)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        money(manager, FundTransactions::Amount)
                            .not_null(),
                    )
                    .col(
                        money(manager, FundTransactions::RunningBalance)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundTransactions::Sequence)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundTransactions::ReferenceType)
                            .string_len(20)
                            .null(),
                    )
                    .col(ColumnDef::new(FundTransactions::ReferenceId).uuid().null())
                    .col(ColumnDef::new(FundTransactions::Description).text().not_null())
                    .col(
                        ColumnDef::new(FundTransactions::TransactionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FundTransactions::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(FundTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fund_transactions_fund_source")
                            .from(FundTransactions::Table, FundTransactions::FundSourceId)
                            .to(FundSources::Table, FundSources::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per ledger position; a second writer at the same position fails here.
        manager
            .create_index(
                Index::create()
                    .name("uq_fund_transactions_sequence")
                    .table(FundTransactions::Table)
                    .col(FundTransactions::FundSourceId)
                    .col(FundTransactions::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fund_transactions_created")
                    .table(FundTransactions::Table)
                    .col(FundTransactions::FundSourceId)
                    .col(FundTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FundTransfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundTransfers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FundTransfers::TransferNumber)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FundTransfers::FromFundSourceId).uuid().not_null())
                    .col(ColumnDef::new(FundTransfers::ToFundSourceId).uuid().not_null())
                    .col(
                        money(manager, FundTransfers::Amount)
                            .not_null(),
                    )
                    .col(
                        money(manager, FundTransfers::TransferFee)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        money(manager, FundTransfers::NetAmount)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FundTransfers::OutTransactionId).uuid().not_null())
                    .col(ColumnDef::new(FundTransfers::InTransactionId).uuid().not_null())
                    .col(
                        ColumnDef::new(FundTransfers::Status)
                            .string_len(10)
                            .not_null()
                            .default("completed"),
                    )
                    .col(ColumnDef::new(FundTransfers::Description).text().null())
                    .col(
                        ColumnDef::new(FundTransfers::TransferDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FundTransfers::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(FundTransfers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fund_transfers_from")
                            .from(FundTransfers::Table, FundTransfers::FromFundSourceId)
                            .to(FundSources::Table, FundSources::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fund_transfers_to")
                            .from(FundTransfers::Table, FundTransfers::ToFundSourceId)
                            .to(FundSources::Table, FundSources::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fund_transfers_out_tx")
                            .from(FundTransfers::Table, FundTransfers::OutTransactionId)
                            .to(FundTransactions::Table, FundTransactions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fund_transfers_in_tx")
                            .from(FundTransfers::Table, FundTransfers::InTransactionId)
                            .to(FundTransactions::Table, FundTransactions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_fund_transfers_number")
                    .table(FundTransfers::Table)
                    .col(FundTransfers::TransferNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FundTransfers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(FundTransactions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(FundSources::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

/// Monetary column at the widest precision the backend accepts.
fn money(manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
    let precision = match manager.get_database_backend() {
        DatabaseBackend::Sqlite => SQLITE_MONEY_PRECISION,
        _ => MONEY_PRECISION,
    };
    ColumnDef::new(column)
        .decimal_len(precision, MONEY_SCALE)
        .to_owned()
}

#[derive(DeriveIden)]
enum FundSources {
    Table,
    Id,
    Name,
    Code,
    FundType,
    BranchId,
    OpeningBalance,
    CurrentBalance,
    Currency,
    BankName,
    AccountNumber,
    AccountHolder,
    Description,
    IsDefault,
    DisplayOrder,
    Status,
    Version,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FundTransactions {
    Table,
    Id,
    FundSourceId,
    TransactionType,
    Direction,
    Amount,
    RunningBalance,
    Sequence,
    ReferenceType,
    ReferenceId,
    Description,
    TransactionDate,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FundTransfers {
    Table,
    Id,
    TransferNumber,
    FromFundSourceId,
    ToFundSourceId,
    Amount,
    TransferFee,
    NetAmount,
    OutTransactionId,
    InTransactionId,
    Status,
    Description,
    TransferDate,
    CreatedBy,
    CreatedAt,
}
