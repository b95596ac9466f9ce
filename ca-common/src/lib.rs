//! # ContractAnalyser Common Library
//!
//! Shared code for the ContractAnalyser services including:
//! - Domain models (contracts, analysis results, findings, redlined clauses)
//! - Database bootstrap and schema
//! - Bearer-token authentication helpers and API response types
//! - Configuration loading
//! - Locale lookup with English fallback
//! - Retry with exponential backoff

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod locale;
pub mod models;
pub mod retry;

pub use error::{Error, Result};
pub use locale::Locale;
pub use retry::{retry, retry_if, RetryPolicy};
