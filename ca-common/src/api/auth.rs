//! API authentication via bearer tokens
//!
//! # Architecture
//!
//! - Every `/api/*` request carries `Authorization: Bearer <token>`
//! - Tokens are random 32-byte values rendered as 64 hex chars
//! - Only the SHA-256 of a token is stored (`api_tokens.token_hash`)
//! - A token may carry an expiry; expired tokens are rejected
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions and database operations.
//! No HTTP framework dependencies (Axum, etc.) - those live in the service crate.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

// ========================================
// Error Types
// ========================================

/// Authentication and authorization error types
#[derive(Debug, Clone, PartialEq)]
pub enum ApiAuthError {
    /// No Authorization header on the request
    MissingToken,

    /// Authorization header present but not `Bearer <token>`
    MalformedHeader,

    /// Token unknown to the token table
    InvalidToken,

    /// Token known but past its expiry
    ExpiredToken { expired_at: DateTime<Utc> },

    /// Authenticated, but the operation requires an admin
    NotAdmin,

    /// Database error while resolving the token
    DatabaseError(String),
}

impl ApiAuthError {
    /// True for failures that mean "who are you?" (401) rather than
    /// "you may not" (403) or a server fault
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            ApiAuthError::MissingToken
                | ApiAuthError::MalformedHeader
                | ApiAuthError::InvalidToken
                | ApiAuthError::ExpiredToken { .. }
        )
    }
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingToken => write!(f, "Missing bearer token"),
            ApiAuthError::MalformedHeader => write!(f, "Malformed Authorization header"),
            ApiAuthError::InvalidToken => write!(f, "Invalid token"),
            ApiAuthError::ExpiredToken { expired_at } => {
                write!(f, "Token expired at {}", expired_at.to_rfc3339())
            }
            ApiAuthError::NotAdmin => write!(f, "Administrator privileges required"),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Identity resolved from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    /// Fail with `NotAdmin` unless the user is an administrator
    pub fn require_admin(&self) -> Result<(), ApiAuthError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiAuthError::NotAdmin)
        }
    }

    /// Admins may act on any user's records; others only on their own
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

// ========================================
// Header Parsing
// ========================================

/// Extract the token from an `Authorization` header value
///
/// # Examples
///
/// ```
/// use ca_common::api::auth::{parse_bearer, ApiAuthError};
///
/// assert_eq!(parse_bearer(Some("Bearer abc123")), Ok("abc123"));
/// assert_eq!(parse_bearer(Some("bearer abc123")), Ok("abc123"));
/// assert_eq!(parse_bearer(None), Err(ApiAuthError::MissingToken));
/// assert_eq!(parse_bearer(Some("Basic abc")), Err(ApiAuthError::MalformedHeader));
/// ```
pub fn parse_bearer(header: Option<&str>) -> Result<&str, ApiAuthError> {
    let header = header.ok_or(ApiAuthError::MissingToken)?.trim();
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(ApiAuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiAuthError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiAuthError::MalformedHeader);
    }

    Ok(token)
}

// ========================================
// Token Hashing and Generation
// ========================================

/// SHA-256 of the token as 64 hex characters
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new random token (64 hex chars)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Database Operations
// ========================================

/// Issue a token for `user_id`; only its hash is persisted
///
/// `ttl` of `None` issues a non-expiring token.
pub async fn issue_token(
    db: &SqlitePool,
    user_id: Uuid,
    ttl: Option<Duration>,
) -> Result<String, ApiAuthError> {
    let token = generate_token();
    let now = Utc::now();
    let expires_at = ttl.map(|ttl| (now + ttl).to_rfc3339());

    sqlx::query(
        "INSERT INTO api_tokens (token_hash, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(user_id.to_string())
    .bind(expires_at)
    .bind(now.to_rfc3339())
    .execute(db)
    .await
    .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(token)
}

/// Resolve a presented token to its user
pub async fn authenticate(db: &SqlitePool, token: &str) -> Result<AuthenticatedUser, ApiAuthError> {
    let row = sqlx::query(
        r#"
        SELECT t.user_id, t.expires_at, u.is_admin
        FROM api_tokens t
        JOIN users u ON u.id = t.user_id
        WHERE t.token_hash = ?
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(db)
    .await
    .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?
    .ok_or(ApiAuthError::InvalidToken)?;

    let expires_at: Option<String> = row.get("expires_at");
    if let Some(expires_at) = expires_at {
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid expires_at: {}", e)))?
            .with_timezone(&Utc);
        if expires_at <= Utc::now() {
            return Err(ApiAuthError::ExpiredToken {
                expired_at: expires_at,
            });
        }
    }

    let user_id: String = row.get("user_id");
    let user_id = Uuid::parse_str(&user_id)
        .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid user id: {}", e)))?;
    let is_admin: i64 = row.get("is_admin");

    Ok(AuthenticatedUser {
        user_id,
        is_admin: is_admin != 0,
    })
}

// ========================================
// Tests
// ========================================
