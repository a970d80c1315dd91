//! Property-based tests for fund postings.
//!
//! - Final balance equals opening plus the sum of accepted signed amounts
//! - A rejected posting leaves the fund untouched
//! - Balances never go negative
//! - Transfers conserve money up to the fee

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::balance::{FundBalance, Posting};
use super::error::FundError;
use super::transfer::TransferPlan;
use super::types::{FundStatus, FundTransactionType};

/// Strategy for amounts between 0.01 and 10,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Operations an operator can perform on a single fund.
#[derive(Debug, Clone)]
enum Operation {
    Deposit(Decimal),
    Withdraw(Decimal),
    Adjust(Decimal),
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        amount().prop_map(Operation::Deposit),
        amount().prop_map(Operation::Withdraw),
        (0i64..2_000_000i64).prop_map(|c| Operation::Adjust(Decimal::new(c, 2))),
    ]
}

fn fund(balance: Decimal) -> FundBalance {
    FundBalance {
        fund_source_id: Uuid::new_v4(),
        current_balance: balance,
        version: 1,
        status: FundStatus::Active,
    }
}

fn plan(state: &FundBalance, op: &Operation) -> Result<Posting, FundError> {
    match op {
        Operation::Deposit(amount) => Posting::plan(state, FundTransactionType::Deposit, *amount),
        Operation::Withdraw(amount) => {
            Posting::plan(state, FundTransactionType::Withdrawal, *amount)
        }
        Operation::Adjust(target) => Posting::plan_adjustment(state, *target),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_balance_equals_opening_plus_signed_sum(
        opening in amount(),
        ops in prop::collection::vec(operation(), 0..40),
    ) {
        let mut state = fund(opening);
        let mut signed_sum = Decimal::ZERO;
        let mut accepted = 0i64;

        for op in &ops {
            if let Ok(posting) = plan(&state, op) {
                prop_assert_eq!(posting.running.previous_balance, state.current_balance);
                prop_assert_eq!(posting.running.sequence, state.version + 1);
                signed_sum += posting.signed_amount();
                state = posting.apply_to(&state);
                accepted += 1;
            }
            prop_assert!(state.current_balance >= Decimal::ZERO);
        }

        prop_assert_eq!(state.current_balance, opening + signed_sum);
        prop_assert_eq!(state.version, 1 + accepted);
    }

    #[test]
    fn prop_overdraft_always_rejected(
        balance in amount(),
        excess in amount(),
    ) {
        let state = fund(balance);
        let result = Posting::plan(&state, FundTransactionType::Withdrawal, balance + excess);
        let is_insufficient = matches!(result, Err(FundError::InsufficientBalance { .. }));
        prop_assert!(is_insufficient);
    }

    #[test]
    fn prop_adjustment_lands_on_target(
        balance in amount(),
        target in (0i64..2_000_000i64).prop_map(|c| Decimal::new(c, 2)),
    ) {
        let state = fund(balance);
        match Posting::plan_adjustment(&state, target) {
            Ok(posting) => {
                prop_assert_eq!(posting.running.current_balance, target);
                prop_assert_eq!(posting.amount, (target - balance).abs());
                prop_assert!(posting.amount > Decimal::ZERO);
            }
            Err(FundError::NoBalanceChange(_)) => prop_assert_eq!(target, balance),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_transfer_conserves_money_minus_fee(
        from_balance in amount(),
        to_balance in amount(),
        amount in amount(),
        fee_cents in 0i64..10_000i64,
    ) {
        let fee = Decimal::new(fee_cents, 2);
        let from = fund(from_balance);
        let to = fund(to_balance);

        match TransferPlan::plan(&from, &to, amount, fee) {
            Ok(plan) => {
                let before = from_balance + to_balance;
                let after = plan.out_leg.running.current_balance + plan.in_leg.running.current_balance;
                prop_assert_eq!(before - after, fee);
                prop_assert_eq!(plan.net_amount, amount - fee);
                prop_assert!(plan.out_leg.running.current_balance >= Decimal::ZERO);
            }
            Err(FundError::InsufficientBalance { .. }) => prop_assert!(amount + fee > from_balance),
            Err(FundError::FeeNotBelowAmount { .. }) => prop_assert!(fee >= amount),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}
