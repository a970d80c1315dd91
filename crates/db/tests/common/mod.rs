//! Shared setup for repository tests.
//!
//! Each test gets its own in-memory SQLite database with the real schema.

#![allow(dead_code)]

use fundledger_core::fund::{FundSourceType, NewFundSource};
use fundledger_db::migration::{Migrator, MigratorTrait};
use fundledger_db::{FundSourceRepository, entities::fund_sources};
use fundledger_shared::LedgerConfig;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// Opens a fresh in-memory database and applies every migration.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite should open");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply");
    db
}

/// Ledger configuration used by the tests.
pub fn ledger_config() -> LedgerConfig {
    LedgerConfig::default()
}

/// A cash register fund with the given code and opening balance.
pub fn new_fund(code: &str, opening_balance: Decimal) -> NewFundSource {
    NewFundSource {
        name: format!("Fund {code}"),
        code: code.to_string(),
        fund_type: FundSourceType::CashRegister,
        branch_id: None,
        opening_balance,
        currency: None,
        bank_name: None,
        account_number: None,
        account_holder: None,
        description: None,
        is_default: false,
        display_order: 0,
    }
}

/// Creates a fund through the repository.
pub async fn create_fund(
    db: &DatabaseConnection,
    code: &str,
    opening_balance: Decimal,
) -> fund_sources::Model {
    FundSourceRepository::new(db.clone(), ledger_config())
        .create(new_fund(code, opening_balance), Some(actor()))
        .await
        .expect("fund should be created")
}

/// A fixed acting user.
pub fn actor() -> Uuid {
    Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001)
}
