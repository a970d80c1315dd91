//! Aggregate views over fund balances for dashboards.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{FundSourceType, FundStatus};

/// The fields of a fund source that summaries read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundSnapshot {
    /// Fund source ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique code.
    pub code: String,
    /// Kind of fund.
    pub fund_type: FundSourceType,
    /// Owning branch, `None` for company-wide.
    pub branch_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: FundStatus,
    /// Current balance.
    pub current_balance: Decimal,
}

/// Balance totals for one fund type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTotal {
    /// Fund type.
    pub fund_type: FundSourceType,
    /// Number of funds.
    pub count: u64,
    /// Sum of balances.
    pub total_balance: Decimal,
}

/// Balance totals for one branch scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchTotal {
    /// Branch, `None` for company-wide funds.
    pub branch_id: Option<Uuid>,
    /// Number of funds.
    pub count: u64,
    /// Sum of balances.
    pub total_balance: Decimal,
}

/// Totals across a set of funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSummary {
    /// Number of funds included.
    pub total_fund_sources: u64,
    /// Sum of all balances.
    pub total_balance: Decimal,
    /// Totals per fund type, ordered by type.
    pub by_type: Vec<TypeTotal>,
    /// Totals per branch, company-wide first.
    pub by_branch: Vec<BranchTotal>,
}

/// An active fund whose balance is below the alert threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowBalanceAlert {
    /// Fund source ID.
    pub fund_source_id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique code.
    pub code: String,
    /// Current balance.
    pub current_balance: Decimal,
    /// Threshold it fell below.
    pub threshold: Decimal,
}

/// Summarizes all non-closed funds in `funds`.
#[must_use]
pub fn summarize(funds: &[FundSnapshot]) -> FundSummary {
    let mut by_type: BTreeMap<FundSourceType, (u64, Decimal)> = BTreeMap::new();
    let mut by_branch: BTreeMap<Option<Uuid>, (u64, Decimal)> = BTreeMap::new();
    let mut total_fund_sources = 0;
    let mut total_balance = Decimal::ZERO;

    for fund in funds.iter().filter(|f| f.status != FundStatus::Closed) {
        total_fund_sources += 1;
        total_balance += fund.current_balance;

        let entry = by_type.entry(fund.fund_type).or_default();
        entry.0 += 1;
        entry.1 += fund.current_balance;

        let entry = by_branch.entry(fund.branch_id).or_default();
        entry.0 += 1;
        entry.1 += fund.current_balance;
    }

    FundSummary {
        total_fund_sources,
        total_balance,
        by_type: by_type
            .into_iter()
            .map(|(fund_type, (count, total_balance))| TypeTotal {
                fund_type,
                count,
                total_balance,
            })
            .collect(),
        by_branch: by_branch
            .into_iter()
            .map(|(branch_id, (count, total_balance))| BranchTotal {
                branch_id,
                count,
                total_balance,
            })
            .collect(),
    }
}

/// Returns active funds below `threshold`, lowest balance first.
#[must_use]
pub fn low_balance_alerts(funds: &[FundSnapshot], threshold: Decimal) -> Vec<LowBalanceAlert> {
    let mut alerts: Vec<LowBalanceAlert> = funds
        .iter()
        .filter(|f| f.status == FundStatus::Active && f.current_balance < threshold)
        .map(|f| LowBalanceAlert {
            fund_source_id: f.id,
            name: f.name.clone(),
            code: f.code.clone(),
            current_balance: f.current_balance,
            threshold,
        })
        .collect();
    alerts.sort_by(|a, b| {
        a.current_balance
            .cmp(&b.current_balance)
            .then_with(|| a.code.cmp(&b.code))
    });
    alerts
}
