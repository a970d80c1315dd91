//! `SeaORM` Entity for fund_transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransferStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fund_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub transfer_number: String,
    pub from_fund_source_id: Uuid,
    pub to_fund_source_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub transfer_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub net_amount: Decimal,
    pub out_transaction_id: Uuid,
    pub in_transaction_id: Uuid,
    pub status: TransferStatus,
    pub description: Option<String>,
    pub transfer_date: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fund_sources::Entity",
        from = "Column::FromFundSourceId",
        to = "super::fund_sources::Column::Id"
    )]
    FromFundSource,
    #[sea_orm(
        belongs_to = "super::fund_sources::Entity",
        from = "Column::ToFundSourceId",
        to = "super::fund_sources::Column::Id"
    )]
    ToFundSource,
}

impl ActiveModelBehavior for ActiveModel {}
