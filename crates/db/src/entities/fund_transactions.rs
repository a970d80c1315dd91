//! `SeaORM` Entity for fund_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use fundledger_core::fund::FundMovement;

use super::sea_orm_active_enums::{FlowDirection, FundTransactionType, ReferenceType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fund_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub fund_source_id: Uuid,
    pub transaction_type: FundTransactionType,
    pub direction: FlowDirection,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub running_balance: Decimal,
    pub sequence: i64,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub description: String,
    pub transaction_date: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fund_sources::Entity",
        from = "Column::FundSourceId",
        to = "super::fund_sources::Column::Id"
    )]
    FundSources,
}

impl Related<super::fund_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundSources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the entry as the audit replay sees it.
    #[must_use]
    pub fn movement(&self) -> FundMovement {
        FundMovement {
            id: self.id,
            transaction_type: self.transaction_type.into(),
            direction: self.direction.into(),
            amount: self.amount,
            running_balance: self.running_balance,
            sequence: self.sequence,
            created_at: self.created_at.with_timezone(&chrono::Utc),
        }
    }
}
