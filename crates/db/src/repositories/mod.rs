//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod audit;
pub mod error;
pub mod fund_source;
pub mod fund_transaction;
pub mod fund_transfer;
mod posting;

pub use audit::AuditRepository;
pub use error::FundRepoError;
pub use fund_source::{
    DeleteOutcome, FundSourceFilter, FundSourceRepository, OPENING_BALANCE_DESCRIPTION,
};
pub use fund_transaction::{
    AdjustBalanceInput, FundTransactionRepository, RecentTransaction, RecordTransactionInput,
    RecordedTransaction, TransactionFilter,
};
pub use fund_transfer::{FundTransferRepository, TransferDetail, TransferFilter, TransferInput};
