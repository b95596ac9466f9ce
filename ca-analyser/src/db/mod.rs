//! Database access for ca-analyser
//!
//! Schema creation lives in `ca_common::db`; this module holds the queries.
//! Identifiers are stored as TEXT UUIDs and timestamps as RFC 3339 strings.

pub mod contracts;
pub mod results;
pub mod settings;
pub mod users;

use ca_common::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;

/// Open the service database in the root folder, creating the schema if needed
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", db_path.display());
    ca_common::db::init_database(db_path).await
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Corrupt id '{}': {}", value, e)))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp '{}': {}", value, e)))
}

/// Fixed-width UTC form, so stored timestamps compare correctly as text
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
