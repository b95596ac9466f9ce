//! Database initialization
//!
//! Creates the schema on first run and seeds default settings. Safe to call on
//! every startup: every statement is idempotent.

use crate::models::user::GLOBAL_EMAIL_REPORTS_ENABLED;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the database at `db_path` and apply the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema (tests, demos)
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    // One connection: every pooled connection to :memory: is a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes if they do not exist
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_api_tokens_table(pool).await?;
    create_app_settings_table(pool).await?;
    create_contracts_table(pool).await?;
    create_analysis_results_table(pool).await?;
    create_findings_table(pool).await?;
    create_redlined_artifacts_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT,
            is_admin INTEGER NOT NULL DEFAULT 0,
            email_reports_enabled INTEGER NOT NULL DEFAULT 1,
            preferred_language TEXT NOT NULL DEFAULT 'en',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_api_tokens_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS api_tokens (
            token_hash TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the app_settings table
///
/// Stores global key-value settings (e.g. `global_email_reports_enabled`).
async fn create_app_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS app_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_contracts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contracts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            contract_text TEXT NOT NULL,
            output_language TEXT NOT NULL DEFAULT 'en',
            marked_for_deletion INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_contracts_user ON contracts(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_analysis_results_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_results (
            id TEXT PRIMARY KEY,
            contract_id TEXT NOT NULL UNIQUE REFERENCES contracts(id) ON DELETE CASCADE,
            executive_summary TEXT NOT NULL,
            data_protection_impact TEXT,
            compliance_score INTEGER NOT NULL CHECK (compliance_score BETWEEN 0 AND 100),
            jurisdiction_summaries TEXT NOT NULL DEFAULT '{}',
            advanced TEXT,
            redlined_clause_artifact_path TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_findings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS findings (
            id TEXT PRIMARY KEY,
            analysis_id TEXT NOT NULL REFERENCES analysis_results(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            risk_level TEXT NOT NULL CHECK (risk_level IN ('high', 'medium', 'low', 'none')),
            jurisdiction TEXT NOT NULL,
            category TEXT NOT NULL,
            recommendations TEXT NOT NULL DEFAULT '[]',
            clause_reference TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_findings_analysis ON findings(analysis_id, position)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_redlined_artifacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS redlined_artifacts (
            id TEXT PRIMARY KEY,
            analysis_id TEXT NOT NULL REFERENCES analysis_results(id) ON DELETE CASCADE,
            finding_id TEXT,
            path TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed default settings without overwriting existing values
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, GLOBAL_EMAIL_REPORTS_ENABLED, "true").await?;
    Ok(())
}

async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    // INSERT OR IGNORE handles concurrent initialization
    let inserted = sqlx::query("INSERT OR IGNORE INTO app_settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?
        .rows_affected();

    if inserted > 0 {
        info!("Initialized setting '{}' with default value: {}", key, default_value);
    }

    Ok(())
}
