//! API module for shared HTTP API functionality
//!
//! Provides bearer-token authentication and the error envelope used by the
//! ContractAnalyser services.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Database operations (via sqlx)
//! - Shared types
//!
//! The service crate wraps these with Axum middleware and extractors.

pub mod auth;
pub mod types;

pub use auth::{
    authenticate, generate_token, hash_token, issue_token, parse_bearer, ApiAuthError,
    AuthenticatedUser,
};
pub use types::{ErrorBody, ErrorResponse};
