//! Fund ledger domain types.
//!
//! Every discriminator the ledger stores is a closed enum here so that
//! matches over fund kinds and transaction kinds stay exhaustive.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of money pool a fund source represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundSourceType {
    /// Physical cash drawer at a point of sale.
    CashRegister,
    /// Bank current or savings account.
    BankAccount,
    /// Petty cash box.
    PettyCash,
    /// Mobile or electronic wallet.
    #[serde(alias = "MOBILE_WALLET")]
    EWallet,
    /// Revolving credit facility.
    CreditLine,
}

impl FundSourceType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashRegister => "CASH_REGISTER",
            Self::BankAccount => "BANK_ACCOUNT",
            Self::PettyCash => "PETTY_CASH",
            Self::EWallet => "E_WALLET",
            Self::CreditLine => "CREDIT_LINE",
        }
    }
}

impl std::str::FromStr for FundSourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASH_REGISTER" => Ok(Self::CashRegister),
            "BANK_ACCOUNT" => Ok(Self::BankAccount),
            "PETTY_CASH" => Ok(Self::PettyCash),
            "E_WALLET" | "MOBILE_WALLET" => Ok(Self::EWallet),
            "CREDIT_LINE" => Ok(Self::CreditLine),
            _ => Err(format!("Unknown fund source type: {s}")),
        }
    }
}

/// Lifecycle status of a fund source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundStatus {
    /// Usable for postings.
    Active,
    /// Temporarily disabled by an operator.
    Inactive,
    /// Soft-deleted; kept because ledger history references it.
    Closed,
}

impl FundStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Closed => "closed",
        }
    }

    /// Returns true if new ledger entries may be appended.
    #[must_use]
    pub const fn accepts_postings(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl std::str::FromStr for FundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Unknown fund status: {s}")),
        }
    }
}

/// Kind of ledger entry appended to a fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundTransactionType {
    /// Balance stamped when the fund is created.
    OpeningBalance,
    /// Money added.
    Deposit,
    /// Money removed.
    Withdrawal,
    /// Operator correction towards a target balance.
    Adjustment,
    /// Credit leg of a transfer.
    TransferIn,
    /// Debit leg of a transfer.
    TransferOut,
}

impl FundTransactionType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpeningBalance => "OPENING_BALANCE",
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Adjustment => "ADJUSTMENT",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
        }
    }

    /// Returns the fixed direction of this kind.
    ///
    /// Adjustments have no fixed direction; theirs follows from the target balance.
    #[must_use]
    pub const fn direction(self) -> Option<FlowDirection> {
        match self {
            Self::OpeningBalance | Self::Deposit | Self::TransferIn => Some(FlowDirection::Inflow),
            Self::Withdrawal | Self::TransferOut => Some(FlowDirection::Outflow),
            Self::Adjustment => None,
        }
    }

    /// Returns true if operators may post this kind directly.
    #[must_use]
    pub const fn is_manual(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdrawal)
    }
}

impl std::str::FromStr for FundTransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPENING_BALANCE" => Ok(Self::OpeningBalance),
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "ADJUSTMENT" => Ok(Self::Adjustment),
            "TRANSFER_IN" => Ok(Self::TransferIn),
            "TRANSFER_OUT" => Ok(Self::TransferOut),
            _ => Err(format!("Unknown fund transaction type: {s}")),
        }
    }
}

/// Direction in which a ledger entry moves the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Balance increases.
    Inflow,
    /// Balance decreases.
    Outflow,
}

impl FlowDirection {
    /// Applies the direction to a positive magnitude.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Inflow => amount,
            Self::Outflow => -amount,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }
}

/// Business document a ledger entry originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    /// Customer payment received.
    ArPayment,
    /// Supplier payment made.
    ApPayment,
    /// Operating expense.
    Expense,
    /// Point-of-sale receipt.
    PosSale,
    /// Fund-to-fund transfer.
    Transfer,
    /// Manual correction.
    Adjustment,
}

impl ReferenceType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArPayment => "AR_PAYMENT",
            Self::ApPayment => "AP_PAYMENT",
            Self::Expense => "EXPENSE",
            Self::PosSale => "POS_SALE",
            Self::Transfer => "TRANSFER",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AR_PAYMENT" => Ok(Self::ArPayment),
            "AP_PAYMENT" => Ok(Self::ApPayment),
            "EXPENSE" => Ok(Self::Expense),
            "POS_SALE" => Ok(Self::PosSale),
            "TRANSFER" => Ok(Self::Transfer),
            "ADJUSTMENT" => Ok(Self::Adjustment),
            _ => Err(format!("Unknown reference type: {s}")),
        }
    }
}

/// Status of a fund transfer.
///
/// Transfers execute synchronously, so `Completed` is the only state written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Both legs were posted.
    Completed,
}

impl TransferStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown transfer status: {s}")),
        }
    }
}

/// Input for creating a fund source.
#[derive(Debug, Clone)]
pub struct NewFundSource {
    /// Display name.
    pub name: String,
    /// Unique code.
    pub code: String,
    /// Kind of fund.
    pub fund_type: FundSourceType,
    /// Owning branch; `None` means company-wide.
    pub branch_id: Option<Uuid>,
    /// Balance at creation.
    pub opening_balance: Decimal,
    /// Currency code; falls back to the configured default.
    pub currency: Option<String>,
    /// Bank name for bank accounts.
    pub bank_name: Option<String>,
    /// Bank account number.
    pub account_number: Option<String>,
    /// Bank account holder.
    pub account_holder: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether this is a default fund for its scope.
    pub is_default: bool,
    /// Sort position in listings.
    pub display_order: i32,
}

/// Field-level changes to a fund source. `None` leaves a field untouched.
///
/// Balances are deliberately absent: they only move through ledger postings.
#[derive(Debug, Clone, Default)]
pub struct FundSourceChanges {
    /// New display name.
    pub name: Option<String>,
    /// New unique code.
    pub code: Option<String>,
    /// New kind.
    pub fund_type: Option<FundSourceType>,
    /// New branch scope (`Some(None)` makes the fund company-wide).
    pub branch_id: Option<Option<Uuid>>,
    /// New bank name.
    pub bank_name: Option<Option<String>>,
    /// New account number.
    pub account_number: Option<Option<String>>,
    /// New account holder.
    pub account_holder: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New currency code.
    pub currency: Option<String>,
    /// New status.
    pub status: Option<FundStatus>,
    /// New default flag.
    pub is_default: Option<bool>,
    /// New sort position.
    pub display_order: Option<i32>,
}

/// A stored ledger entry as seen by business rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundMovement {
    /// Transaction ID.
    pub id: Uuid,
    /// Kind of entry.
    pub transaction_type: FundTransactionType,
    /// Direction the entry moved the balance.
    pub direction: FlowDirection,
    /// Positive magnitude.
    pub amount: Decimal,
    /// Balance recorded right after this entry.
    pub running_balance: Decimal,
    /// Position in the fund's ledger (1-based).
    pub sequence: i64,
    /// Write timestamp.
    pub created_at: DateTime<Utc>,
}

impl FundMovement {
    /// Returns the signed effect of this entry on the balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}
