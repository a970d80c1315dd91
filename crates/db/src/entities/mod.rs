//! `SeaORM` entity definitions for the fund ledger tables.

pub mod fund_sources;
pub mod fund_transactions;
pub mod fund_transfers;
pub mod sea_orm_active_enums;
