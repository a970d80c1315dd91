//! `SeaORM` active enums for the fund ledger tables.
//!
//! Stored as short strings so the schema stays portable; each enum converts
//! losslessly to and from its counterpart in `fundledger_core::fund`.

use fundledger_core::fund as domain;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored fund source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum FundSourceType {
    #[sea_orm(string_value = "CASH_REGISTER")]
    CashRegister,
    #[sea_orm(string_value = "BANK_ACCOUNT")]
    BankAccount,
    #[sea_orm(string_value = "PETTY_CASH")]
    PettyCash,
    #[sea_orm(string_value = "E_WALLET")]
    EWallet,
    #[sea_orm(string_value = "CREDIT_LINE")]
    CreditLine,
}

/// Stored fund lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum FundStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// Stored ledger entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum FundTransactionType {
    #[sea_orm(string_value = "OPENING_BALANCE")]
    OpeningBalance,
    #[sea_orm(string_value = "DEPOSIT")]
    Deposit,
    #[sea_orm(string_value = "WITHDRAWAL")]
    Withdrawal,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "TRANSFER_IN")]
    TransferIn,
    #[sea_orm(string_value = "TRANSFER_OUT")]
    TransferOut,
}

/// Stored balance direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum FlowDirection {
    #[sea_orm(string_value = "inflow")]
    Inflow,
    #[sea_orm(string_value = "outflow")]
    Outflow,
}

/// Stored originating document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReferenceType {
    #[sea_orm(string_value = "AR_PAYMENT")]
    ArPayment,
    #[sea_orm(string_value = "AP_PAYMENT")]
    ApPayment,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
    #[sea_orm(string_value = "POS_SALE")]
    PosSale,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
}

/// Stored transfer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum TransferStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Generates the two `From` impls between a db enum and its domain twin.
macro_rules! mirror_enum {
    ($name:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<domain::$name> for $name {
            fn from(value: domain::$name) -> Self {
                match value {
                    $(domain::$name::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$name> for domain::$name {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(FundSourceType, [CashRegister, BankAccount, PettyCash, EWallet, CreditLine]);
mirror_enum!(FundStatus, [Active, Inactive, Closed]);
mirror_enum!(
    FundTransactionType,
    [OpeningBalance, Deposit, Withdrawal, Adjustment, TransferIn, TransferOut]
);
mirror_enum!(FlowDirection, [Inflow, Outflow]);
mirror_enum!(ReferenceType, [ArPayment, ApPayment, Expense, PosSale, Transfer, Adjustment]);
mirror_enum!(TransferStatus, [Completed]);
