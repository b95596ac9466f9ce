//! Global settings operations
//!
//! Key-value rows in `app_settings`. Handlers read one [`AppSettings`]
//! snapshot per request instead of consulting the table ad hoc.

use ca_common::models::user::GLOBAL_EMAIL_REPORTS_ENABLED;
use ca_common::models::AppSettings;
use ca_common::{Error, Result};
use sqlx::SqlitePool;

/// Read the settings snapshot; missing rows take their defaults
pub async fn load_app_settings(db: &SqlitePool) -> Result<AppSettings> {
    let defaults = AppSettings::default();
    Ok(AppSettings {
        global_email_reports_enabled: get_setting(db, GLOBAL_EMAIL_REPORTS_ENABLED)
            .await?
            .unwrap_or(defaults.global_email_reports_enabled),
    })
}

pub async fn set_global_email_reports_enabled(db: &SqlitePool, enabled: bool) -> Result<()> {
    set_setting(db, GLOBAL_EMAIL_REPORTS_ENABLED, enabled).await
}

/// Generic setting getter (internal)
async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM app_settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (internal)
async fn set_setting<T>(db: &SqlitePool, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO app_settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}
