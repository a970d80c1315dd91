//! `SeaORM` Entity for fund_sources table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::fund::{FundBalance, FundSnapshot};

use super::sea_orm_active_enums::{FundSourceType, FundStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fund_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub fund_type: FundSourceType,
    pub branch_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    pub currency: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
    pub description: Option<String>,
    pub is_default: bool,
    pub display_order: i32,
    pub status: FundStatus,
    pub version: i64,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fund_transactions::Entity")]
    FundTransactions,
}

impl Related<super::fund_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the ledger state the posting rules operate on.
    #[must_use]
    pub fn balance_state(&self) -> FundBalance {
        FundBalance {
            fund_source_id: self.id,
            current_balance: self.current_balance,
            version: self.version,
            status: self.status.into(),
        }
    }

    /// Returns the fields summaries aggregate over.
    #[must_use]
    pub fn snapshot(&self) -> FundSnapshot {
        FundSnapshot {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            fund_type: self.fund_type.into(),
            branch_id: self.branch_id,
            status: self.status.into(),
            current_balance: self.current_balance,
        }
    }
}
