//! Core business logic for Fundledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `fund` - Fund sources, postings, adjustments and transfers
//! - `audit` - Replay-based balance reconciliation of fund balances

pub mod audit;
pub mod fund;
