//! Shared types, errors, and configuration for Fundledger.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes and monetary precision rules
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig, LogConfig, ServerConfig};
pub use error::{AppError, AppResult};
