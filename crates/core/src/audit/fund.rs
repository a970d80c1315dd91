//! Fund balance audit.
//!
//! A fund's replay starts at its opening balance; the OPENING_BALANCE entry
//! itself is the zero point and is therefore left out of the replay.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::replay::{AuditItem, AuditReport, AuditSubject, Movement, audit_all, audit_subject};
use crate::fund::{FundMovement, FundTransactionType};

impl Movement for FundMovement {
    fn delta(&self) -> Decimal {
        self.signed_amount()
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn sequence(&self) -> i64 {
        self.sequence
    }

    fn recorded_balance(&self) -> Option<Decimal> {
        Some(self.running_balance)
    }
}

/// Identifies an audited fund in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundAuditKey {
    /// Fund source ID.
    pub fund_source_id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique code.
    pub code: String,
}

/// Audit result for one fund.
pub type FundAuditItem = AuditItem<FundAuditKey, FundMovement>;

/// Audit results for a set of funds.
pub type FundAuditReport = AuditReport<FundAuditKey, FundMovement>;

/// A fund together with its complete ledger.
#[derive(Debug, Clone)]
pub struct FundHistory {
    /// Fund identity.
    pub key: FundAuditKey,
    /// Balance at creation.
    pub opening_balance: Decimal,
    /// Balance currently stored on the fund.
    pub current_balance: Decimal,
    /// Every ledger entry of the fund.
    pub transactions: Vec<FundMovement>,
}

impl From<FundHistory> for AuditSubject<FundAuditKey, FundMovement> {
    fn from(history: FundHistory) -> Self {
        Self {
            key: history.key,
            system_value: history.current_balance,
            starting_value: history.opening_balance,
            movements: history
                .transactions
                .into_iter()
                .filter(|tx| tx.transaction_type != FundTransactionType::OpeningBalance)
                .collect(),
        }
    }
}

/// Audits a single fund.
#[must_use]
pub fn audit_fund(history: FundHistory) -> FundAuditItem {
    audit_subject(history.into())
}

/// Audits many funds.
#[must_use]
pub fn audit_funds(histories: Vec<FundHistory>) -> FundAuditReport {
    audit_all(histories.into_iter().map(Into::into).collect())
}
