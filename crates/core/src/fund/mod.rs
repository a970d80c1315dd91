//! Fund source ledger.
//!
//! Pure business rules for fund sources: postings with running balances,
//! balance adjustments, transfers with fees, input validation and
//! dashboard summaries. Persistence lives in the db crate; everything here
//! works on plain values so it can be checked before any write happens.

mod balance;
mod error;
mod summary;
mod transfer;
mod types;
mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{FundBalance, Posting, RunningBalance};
pub use error::FundError;
pub use summary::{
    BranchTotal, FundSnapshot, FundSummary, LowBalanceAlert, TypeTotal, low_balance_alerts,
    summarize,
};
pub use transfer::{
    TRANSFER_NUMBER_PREFIX, TransferPlan, incoming_description, next_transfer_number,
    outgoing_description, transfer_number_prefix,
};
pub use types::{
    FlowDirection, FundMovement, FundSourceChanges, FundSourceType, FundStatus,
    FundTransactionType, NewFundSource, ReferenceType, TransferStatus,
};
pub use validation::{
    MAX_CODE_LEN, MAX_NAME_LEN, adjustment_description, manual_description, mask_account_number,
    normalize_code, normalize_currency, normalize_name, normalize_reason, validate_amount,
    validate_changes, validate_new_fund_source, validate_non_negative,
};
