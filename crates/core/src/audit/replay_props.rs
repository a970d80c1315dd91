//! Property-based tests for balance replay.
//!
//! - Replay of a history produced by real postings always passes
//! - Input order of movements never changes the outcome
//! - Tampering with the stored balance yields exactly the tampered variance

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{AuditStatus, FundAuditKey, FundHistory, audit_fund};
use crate::fund::{FundBalance, FundMovement, FundStatus, FundTransactionType, Posting};

/// Strategy for amounts between 0.01 and 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a deposit-or-withdrawal request.
fn request() -> impl Strategy<Value = (bool, Decimal)> {
    (any::<bool>(), amount())
}

/// Builds a ledger the way the recorder would, skipping rejected withdrawals.
fn build_history(opening: Decimal, requests: &[(bool, Decimal)]) -> FundHistory {
    let fund_source_id = Uuid::new_v4();
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut transactions = Vec::new();
    let mut state = FundBalance {
        fund_source_id,
        current_balance: Decimal::ZERO,
        version: 0,
        status: FundStatus::Active,
    };

    if let Some(posting) = Posting::opening(opening) {
        transactions.push(movement(&posting, start));
        state = posting.apply_to(&state);
    }

    for (deposit, amount) in requests {
        let kind = if *deposit {
            FundTransactionType::Deposit
        } else {
            FundTransactionType::Withdrawal
        };
        if let Ok(posting) = Posting::plan(&state, kind, *amount) {
            // Several entries share a timestamp so the sequence tie-break matters.
            let at = start + Duration::seconds(posting.running.sequence / 3);
            transactions.push(movement(&posting, at));
            state = posting.apply_to(&state);
        }
    }

    FundHistory {
        key: FundAuditKey {
            fund_source_id,
            name: "Prop Fund".to_string(),
            code: "PROP".to_string(),
        },
        opening_balance: opening,
        current_balance: state.current_balance,
        transactions,
    }
}

fn movement(posting: &Posting, at: chrono::DateTime<Utc>) -> FundMovement {
    FundMovement {
        id: Uuid::new_v4(),
        transaction_type: posting.transaction_type,
        direction: posting.direction,
        amount: posting.amount,
        running_balance: posting.running.current_balance,
        sequence: posting.running.sequence,
        created_at: at,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_recorded_history_passes_audit(
        opening in (0i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2)),
        requests in prop::collection::vec(request(), 0..30),
    ) {
        let history = build_history(opening, &requests);
        let item = audit_fund(history);

        prop_assert_eq!(item.status, AuditStatus::Pass);
        prop_assert_eq!(item.variance, Decimal::ZERO);
        prop_assert_eq!(item.broken_links, 0);
        prop_assert!(item.calculated_value >= Decimal::ZERO);
    }

    #[test]
    fn prop_replay_ignores_input_order(
        opening in amount(),
        requests in prop::collection::vec(request(), 1..30),
    ) {
        let history = build_history(opening, &requests);
        let mut reversed = history.clone();
        reversed.transactions.reverse();

        let forward = audit_fund(history);
        let backward = audit_fund(reversed);

        prop_assert_eq!(forward.calculated_value, backward.calculated_value);
        prop_assert_eq!(forward.status, backward.status);
        prop_assert_eq!(forward.broken_links, backward.broken_links);
    }

    #[test]
    fn prop_tampering_reports_exact_variance(
        opening in amount(),
        requests in prop::collection::vec(request(), 0..20),
        drift in amount(),
        upward in any::<bool>(),
    ) {
        let mut history = build_history(opening, &requests);
        let drift = if upward { drift } else { -drift };
        history.current_balance += drift;

        let item = audit_fund(history);
        prop_assert_eq!(item.status, AuditStatus::Fail);
        prop_assert_eq!(item.variance, drift);
    }
}
