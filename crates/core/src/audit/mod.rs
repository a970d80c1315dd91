//! Read-only balance reconciliation.
//!
//! Stored balances are recomputed from their full history and compared
//! against what is stored. Nothing here writes; corrections go through an
//! explicit adjustment.

mod fund;
mod replay;

#[cfg(test)]
mod replay_props;

pub use fund::{
    FundAuditItem, FundAuditKey, FundAuditReport, FundHistory, audit_fund, audit_funds,
};
pub use replay::{
    AuditItem, AuditReport, AuditStatus, AuditSubject, Movement, ReplayStep, audit_all,
    audit_subject, replay_order,
};
