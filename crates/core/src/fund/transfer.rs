//! Fund-to-fund transfer planning and transfer numbering.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::{FundBalance, Posting};
use super::error::FundError;
use super::types::FundTransactionType;
use super::validation::{validate_amount, validate_non_negative};

/// Prefix of every transfer number.
pub const TRANSFER_NUMBER_PREFIX: &str = "TRF";

/// Both legs of a transfer, computed before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlan {
    /// Gross amount requested.
    pub amount: Decimal,
    /// Fee charged to the source fund.
    pub fee: Decimal,
    /// Amount credited to the destination (`amount - fee`).
    pub net_amount: Decimal,
    /// TRANSFER_OUT leg on the source, for `amount + fee`.
    pub out_leg: Posting,
    /// TRANSFER_IN leg on the destination, for `net_amount`.
    pub in_leg: Posting,
}

impl TransferPlan {
    /// Plans a transfer between two funds.
    ///
    /// The source is checked before the destination so a debit failure
    /// is reported even if the destination would also reject the entry.
    ///
    /// # Errors
    ///
    /// - `SameFundSource` if both funds are the same
    /// - `NonPositiveAmount`, `NegativeValue`, `AmountTooLarge` or `ExcessPrecision` for bad figures
    /// - `FeeNotBelowAmount` if the fee leaves nothing to credit
    /// - `InsufficientBalance` if the source cannot cover `amount + fee`
    /// - `FundSourceClosed` if either fund is closed
    pub fn plan(
        from: &FundBalance,
        to: &FundBalance,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<Self, FundError> {
        if from.fund_source_id == to.fund_source_id {
            return Err(FundError::SameFundSource);
        }
        validate_amount("amount", amount)?;
        validate_non_negative("transferFee", fee)?;
        if fee >= amount {
            return Err(FundError::FeeNotBelowAmount { amount, fee });
        }

        let net_amount = amount - fee;
        let gross = amount
            .checked_add(fee)
            .ok_or(FundError::AmountTooLarge("amount"))?;
        let out_leg = Posting::plan(from, FundTransactionType::TransferOut, gross)?;
        let in_leg = Posting::plan(to, FundTransactionType::TransferIn, net_amount)?;

        Ok(Self {
            amount,
            fee,
            net_amount,
            out_leg,
            in_leg,
        })
    }
}

/// Returns the day prefix shared by all transfers on `date`, e.g. `TRF-20260115-`.
#[must_use]
pub fn transfer_number_prefix(date: NaiveDate) -> String {
    format!("{TRANSFER_NUMBER_PREFIX}-{}-", date.format("%Y%m%d"))
}

/// Returns the transfer number following every number already issued on `date`.
///
/// Counters compare numerically, so `-10000` follows `-9999`. Numbers from
/// other days or that do not parse are ignored.
#[must_use]
pub fn next_transfer_number<'a>(
    date: NaiveDate,
    issued: impl IntoIterator<Item = &'a str>,
) -> String {
    let prefix = transfer_number_prefix(date);
    let next = issued
        .into_iter()
        .filter_map(|number| number.strip_prefix(&prefix))
        .filter_map(|counter| counter.parse::<u32>().ok())
        .max()
        .map_or(1, |counter| counter.saturating_add(1));
    format!("{prefix}{next:04}")
}

/// Description written on the TRANSFER_OUT leg.
#[must_use]
pub fn outgoing_description(destination_name: &str, fee: Decimal, note: Option<&str>) -> String {
    let mut description = format!("Transfer to {destination_name}");
    if fee > Decimal::ZERO {
        description.push_str(&format!(" (incl. fee {fee})"));
    }
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        description.push_str(&format!(" - {note}"));
    }
    description
}

/// Description written on the TRANSFER_IN leg.
#[must_use]
pub fn incoming_description(source_name: &str, note: Option<&str>) -> String {
    let mut description = format!("Transfer from {source_name}");
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        description.push_str(&format!(" - {note}"));
    }
    description
}
