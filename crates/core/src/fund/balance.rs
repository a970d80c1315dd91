//! Running balance arithmetic for fund ledgers.
//!
//! A fund's ledger is an append-only chain: each entry records the balance
//! right after it, and the fund row caches the latest one together with a
//! version equal to the number of entries written so far.

use fundledger_shared::types::{has_valid_scale, is_within_limit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FundError;
use super::types::{FlowDirection, FundStatus, FundTransactionType};
use super::validation::validate_amount;

/// The mutable ledger state cached on a fund source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundBalance {
    /// Fund source ID.
    pub fund_source_id: Uuid,
    /// Balance after the latest entry.
    pub current_balance: Decimal,
    /// Number of entries appended so far.
    pub version: i64,
    /// Lifecycle status.
    pub status: FundStatus,
}

impl FundBalance {
    /// Returns true if the fund can cover a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_balance(&self, amount: Decimal) -> bool {
        self.current_balance >= amount
    }

    /// Fails unless the fund accepts new entries.
    ///
    /// # Errors
    ///
    /// Returns `FundSourceClosed` for closed funds.
    pub fn ensure_postable(&self) -> Result<(), FundError> {
        if self.status.accepts_postings() {
            Ok(())
        } else {
            Err(FundError::FundSourceClosed(self.fund_source_id))
        }
    }
}

/// Running balance information for one ledger entry.
///
/// - `sequence` increases by exactly one per entry
/// - `previous_balance` equals the prior entry's `current_balance`
/// - `current_balance = previous_balance + signed amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Position of the entry in the fund's ledger (1-based).
    pub sequence: i64,
    /// Balance before this entry.
    pub previous_balance: Decimal,
    /// Balance after this entry.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Running balance for the first entry of a fund.
    #[must_use]
    pub fn first_entry(balance_change: Decimal) -> Self {
        Self {
            sequence: 1,
            previous_balance: Decimal::ZERO,
            current_balance: balance_change,
        }
    }

    /// Running balance for the entry that follows `state`.
    ///
    /// # Errors
    ///
    /// Returns `AmountTooLarge` if the new balance would not fit a money column.
    pub fn after(state: &FundBalance, balance_change: Decimal) -> Result<Self, FundError> {
        let current_balance = state
            .current_balance
            .checked_add(balance_change)
            .filter(|balance| is_within_limit(*balance))
            .ok_or(FundError::AmountTooLarge("balance"))?;
        Ok(Self {
            sequence: state.version + 1,
            previous_balance: state.current_balance,
            current_balance,
        })
    }
}

/// A ledger entry ready to be written, with its balance effect computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Kind of entry.
    pub transaction_type: FundTransactionType,
    /// Direction of the balance change.
    pub direction: FlowDirection,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Resulting running balance.
    pub running: RunningBalance,
}

impl Posting {
    /// Plans the opening entry of a newly created fund.
    ///
    /// Returns `None` for a zero opening balance: such a fund starts with an
    /// empty ledger.
    #[must_use]
    pub fn opening(opening_balance: Decimal) -> Option<Self> {
        if opening_balance <= Decimal::ZERO {
            return None;
        }
        Some(Self {
            transaction_type: FundTransactionType::OpeningBalance,
            direction: FlowDirection::Inflow,
            amount: opening_balance,
            running: RunningBalance::first_entry(opening_balance),
        })
    }

    /// Plans a fixed-direction entry against the current fund state.
    ///
    /// Outflows are strict: the balance may never go below zero.
    ///
    /// # Errors
    ///
    /// - `FundSourceClosed` if the fund accepts no entries
    /// - `NonPositiveAmount` / `ExcessPrecision` for a bad amount
    /// - `UnsupportedTransactionType` for adjustments and opening entries
    /// - `InsufficientBalance` if an outflow exceeds the balance
    /// - `AmountTooLarge` if an inflow would push the balance past the column limit
    pub fn plan(
        state: &FundBalance,
        transaction_type: FundTransactionType,
        amount: Decimal,
    ) -> Result<Self, FundError> {
        state.ensure_postable()?;
        validate_amount("amount", amount)?;

        let direction = match (transaction_type, transaction_type.direction()) {
            (FundTransactionType::OpeningBalance, _) | (_, None) => {
                return Err(FundError::UnsupportedTransactionType(
                    transaction_type.as_str(),
                ));
            }
            (_, Some(direction)) => direction,
        };

        if direction == FlowDirection::Outflow && !state.has_sufficient_balance(amount) {
            return Err(FundError::InsufficientBalance {
                available: state.current_balance,
                required: amount,
            });
        }

        Ok(Self {
            transaction_type,
            direction,
            amount,
            running: RunningBalance::after(state, direction.signed(amount))?,
        })
    }

    /// Plans an adjustment that moves the balance to `new_balance`.
    ///
    /// The entry amount is `|new_balance - current_balance|` and the
    /// direction follows the sign of the difference.
    ///
    /// # Errors
    ///
    /// - `FundSourceClosed` if the fund accepts no entries
    /// - `NegativeValue` / `AmountTooLarge` / `ExcessPrecision` for a bad target
    /// - `NoBalanceChange` if the target equals the current balance
    pub fn plan_adjustment(state: &FundBalance, new_balance: Decimal) -> Result<Self, FundError> {
        state.ensure_postable()?;
        if new_balance < Decimal::ZERO {
            return Err(FundError::NegativeValue("newBalance"));
        }
        if !is_within_limit(new_balance) {
            return Err(FundError::AmountTooLarge("newBalance"));
        }
        if !has_valid_scale(new_balance) {
            return Err(FundError::ExcessPrecision("newBalance"));
        }

        let difference = new_balance
            .checked_sub(state.current_balance)
            .ok_or(FundError::AmountTooLarge("newBalance"))?;
        if difference.is_zero() {
            return Err(FundError::NoBalanceChange(state.current_balance));
        }

        let direction = if difference.is_sign_positive() {
            FlowDirection::Inflow
        } else {
            FlowDirection::Outflow
        };

        Ok(Self {
            transaction_type: FundTransactionType::Adjustment,
            direction,
            amount: difference.abs(),
            running: RunningBalance::after(state, difference)?,
        })
    }

    /// Returns the signed effect on the balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }

    /// Returns the fund state after this entry is applied.
    #[must_use]
    pub fn apply_to(&self, state: &FundBalance) -> FundBalance {
        FundBalance {
            current_balance: self.running.current_balance,
            version: self.running.sequence,
            ..*state
        }
    }
}
