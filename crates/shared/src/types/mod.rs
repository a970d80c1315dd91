//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{
    CurrencyCode, MAX_AMOUNT, MONEY_PRECISION, MONEY_SCALE, has_valid_scale, is_within_limit,
};
pub use pagination::{PageMeta, PageRequest, PageResponse};
