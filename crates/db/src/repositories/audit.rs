//! Fund balance audit repository.
//!
//! Loads funds with their complete ledgers and hands them to the replay in
//! `fundledger_core::audit`. Strictly read-only.

use std::collections::HashMap;

use fundledger_core::audit::{
    FundAuditItem, FundAuditKey, FundAuditReport, FundHistory, audit_fund, audit_funds,
};
use fundledger_core::fund::FundError;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::FundRepoError;
use super::fund_source::branch_scope;
use crate::entities::{fund_sources, fund_transactions};

/// Fund balance audit repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Audits a single fund.
    ///
    /// # Errors
    ///
    /// Returns `FundSourceNotFound` if the fund does not exist.
    pub async fn audit_fund(&self, fund_source_id: Uuid) -> Result<FundAuditItem, FundRepoError> {
        let fund = fund_sources::Entity::find_by_id(fund_source_id)
            .one(&self.db)
            .await?
            .ok_or(FundRepoError::Fund(FundError::FundSourceNotFound(
                fund_source_id,
            )))?;

        let transactions = fund_transactions::Entity::find()
            .filter(fund_transactions::Column::FundSourceId.eq(fund_source_id))
            .order_by_asc(fund_transactions::Column::Sequence)
            .all(&self.db)
            .await?;

        let item = audit_fund(history(fund, &transactions));
        log_item(&item);
        Ok(item)
    }

    /// Audits every fund, optionally only those visible to one branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn audit_all(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<FundAuditReport, FundRepoError> {
        let mut query = fund_sources::Entity::find();
        if let Some(branch_id) = branch_id {
            query = query.filter(branch_scope(branch_id));
        }
        let funds = query
            .order_by_asc(fund_sources::Column::Code)
            .all(&self.db)
            .await?;

        let fund_ids: Vec<Uuid> = funds.iter().map(|f| f.id).collect();
        let transactions = fund_transactions::Entity::find()
            .filter(fund_transactions::Column::FundSourceId.is_in(fund_ids))
            .order_by_asc(fund_transactions::Column::Sequence)
            .all(&self.db)
            .await?;

        let mut by_fund: HashMap<Uuid, Vec<fund_transactions::Model>> = HashMap::new();
        for tx in transactions {
            by_fund.entry(tx.fund_source_id).or_default().push(tx);
        }

        let histories = funds
            .into_iter()
            .map(|fund| {
                let ledger = by_fund.remove(&fund.id).unwrap_or_default();
                history(fund, &ledger)
            })
            .collect();

        let report = audit_funds(histories);
        for item in &report.items {
            log_item(item);
        }
        info!(
            total_checked = report.total_checked,
            discrepancies_found = report.discrepancies_found,
            "Fund audit completed"
        );
        Ok(report)
    }
}

fn history(fund: fund_sources::Model, transactions: &[fund_transactions::Model]) -> FundHistory {
    FundHistory {
        key: FundAuditKey {
            fund_source_id: fund.id,
            name: fund.name,
            code: fund.code,
        },
        opening_balance: fund.opening_balance,
        current_balance: fund.current_balance,
        transactions: transactions
            .iter()
            .map(fund_transactions::Model::movement)
            .collect(),
    }
}

fn log_item(item: &FundAuditItem) {
    if item.variance.is_zero() && item.broken_links == 0 {
        return;
    }
    warn!(
        fund_source_id = %item.key.fund_source_id,
        code = %item.key.code,
        system_balance = %item.system_value,
        calculated_balance = %item.calculated_value,
        variance = %item.variance,
        broken_links = item.broken_links,
        "Fund balance discrepancy"
    );
}
