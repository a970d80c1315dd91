//! Generic balance replay.
//!
//! A subject (a fund, or any other tracked quantity) has a stored value and a
//! history of movements. Replaying the history from a known starting value
//! must reproduce the stored value; any difference is drift.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single recorded change to an audited value.
pub trait Movement {
    /// Signed effect on the value.
    fn delta(&self) -> Decimal;

    /// When the movement was written.
    fn recorded_at(&self) -> DateTime<Utc>;

    /// Tie-break for movements written at the same instant.
    fn sequence(&self) -> i64;

    /// Value the writer stored right after this movement, if it stores one.
    fn recorded_balance(&self) -> Option<Decimal> {
        None
    }
}

/// Strict total order used for replay: timestamp, then sequence.
#[must_use]
pub fn replay_order<M: Movement>(a: &M, b: &M) -> Ordering {
    a.recorded_at()
        .cmp(&b.recorded_at())
        .then_with(|| a.sequence().cmp(&b.sequence()))
}

/// Outcome of comparing a stored value with its replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    /// Stored value matches the replay.
    Pass,
    /// Stored value differs from the replay.
    Fail,
}

/// Something to audit: a stored value plus its movement history.
#[derive(Debug, Clone)]
pub struct AuditSubject<K, M> {
    /// Identifies the subject in the report.
    pub key: K,
    /// Value currently stored.
    pub system_value: Decimal,
    /// Value the replay starts from.
    pub starting_value: Decimal,
    /// Movements in any order.
    pub movements: Vec<M>,
}

/// One replayed movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep<M> {
    /// The movement as stored.
    pub movement: M,
    /// Value before the movement.
    pub balance_before: Decimal,
    /// Value after the movement.
    pub balance_after: Decimal,
    /// Whether the stored balance on the movement matches the replay.
    /// `None` when the movement stores no balance.
    pub link_intact: Option<bool>,
}

/// Audit result for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditItem<K, M> {
    /// Subject key.
    pub key: K,
    /// Value currently stored.
    pub system_value: Decimal,
    /// Value obtained by replay.
    pub calculated_value: Decimal,
    /// `system_value - calculated_value`.
    pub variance: Decimal,
    /// `Pass` iff variance is zero.
    pub status: AuditStatus,
    /// Number of movements replayed.
    pub movement_count: usize,
    /// Number of movements whose stored balance disagrees with the replay.
    pub broken_links: usize,
    /// The replay, in order.
    pub movements: Vec<ReplayStep<M>>,
}

/// Audit results for a set of subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport<K, M> {
    /// Number of subjects checked.
    pub total_checked: usize,
    /// Number of subjects that failed.
    pub discrepancies_found: usize,
    /// Per-subject results, in input order.
    pub items: Vec<AuditItem<K, M>>,
}

impl<K, M> AuditReport<K, M> {
    /// Returns true if every subject passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.discrepancies_found == 0
    }
}

/// Replays one subject.
#[must_use]
pub fn audit_subject<K, M: Movement>(subject: AuditSubject<K, M>) -> AuditItem<K, M> {
    let AuditSubject {
        key,
        system_value,
        starting_value,
        mut movements,
    } = subject;

    movements.sort_by(replay_order);

    let mut balance = starting_value;
    let mut broken_links = 0;
    let steps: Vec<ReplayStep<M>> = movements
        .into_iter()
        .map(|movement| {
            let balance_before = balance;
            balance += movement.delta();
            let link_intact = movement.recorded_balance().map(|stored| stored == balance);
            if link_intact == Some(false) {
                broken_links += 1;
            }
            ReplayStep {
                movement,
                balance_before,
                balance_after: balance,
                link_intact,
            }
        })
        .collect();

    let variance = system_value - balance;
    AuditItem {
        key,
        system_value,
        calculated_value: balance,
        variance,
        status: if variance.is_zero() {
            AuditStatus::Pass
        } else {
            AuditStatus::Fail
        },
        movement_count: steps.len(),
        broken_links,
        movements: steps,
    }
}

/// Replays every subject in parallel and aggregates the results.
#[must_use]
pub fn audit_all<K, M>(subjects: Vec<AuditSubject<K, M>>) -> AuditReport<K, M>
where
    K: Send,
    M: Movement + Send,
{
    let items: Vec<AuditItem<K, M>> = subjects.into_par_iter().map(audit_subject).collect();
    let discrepancies_found = items
        .iter()
        .filter(|item| item.status == AuditStatus::Fail)
        .count();
    AuditReport {
        total_checked: items.len(),
        discrepancies_found,
        items,
    }
}
