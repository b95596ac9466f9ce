//! User profile operations

use super::{format_timestamp, parse_uuid};
use ca_common::locale::normalize_language;
use ca_common::models::UserProfile;
use ca_common::{Error, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn user_from_row(row: &SqliteRow) -> Result<UserProfile> {
    Ok(UserProfile {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        email: row.get("email"),
        display_name: row.get("display_name"),
        is_admin: row.get("is_admin"),
        email_reports_enabled: row.get("email_reports_enabled"),
        preferred_language: row.get("preferred_language"),
    })
}

/// Create a user account
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    display_name: Option<&str>,
    is_admin: bool,
) -> Result<UserProfile> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::InvalidInput(format!("Invalid email address: '{}'", email)));
    }

    let user = UserProfile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        display_name: display_name.map(str::to_string),
        is_admin,
        email_reports_enabled: true,
        preferred_language: "en".to_string(),
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, email, display_name, is_admin, email_reports_enabled, preferred_language, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(user.is_admin)
    .bind(user.email_reports_enabled)
    .bind(&user.preferred_language)
    .bind(format_timestamp(Utc::now()))
    .execute(pool)
    .await?;

    Ok(user)
}

pub async fn load_user(pool: &SqlitePool, user_id: Uuid) -> Result<Option<UserProfile>> {
    let row = sqlx::query(
        "SELECT id, email, display_name, is_admin, email_reports_enabled, preferred_language FROM users WHERE id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Update the caller's own delivery preferences; absent fields are left unchanged
pub async fn update_preferences(
    pool: &SqlitePool,
    user_id: Uuid,
    email_reports_enabled: Option<bool>,
    preferred_language: Option<&str>,
) -> Result<UserProfile> {
    let language = preferred_language.map(normalize_language);

    let updated = sqlx::query(
        r#"
        UPDATE users SET
            email_reports_enabled = COALESCE(?, email_reports_enabled),
            preferred_language = COALESCE(?, preferred_language)
        WHERE id = ?
        "#,
    )
    .bind(email_reports_enabled)
    .bind(language)
    .bind(user_id.to_string())
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("User {}", user_id)));
    }

    load_user(pool, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ca_common::db::init_memory_database;

    #[tokio::test]
    async fn test_create_and_load() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "ana@example.com", Some("Ana"), false).await.unwrap();

        let loaded = load_user(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(loaded, user);
        assert!(loaded.email_reports_enabled);
        assert_eq!(loaded.preferred_language, "en");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let pool = init_memory_database().await.unwrap();
        assert!(matches!(
            create_user(&pool, "not-an-email", None, false).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, "ana@example.com", None, false).await.unwrap();
        assert!(create_user(&pool, "ana@example.com", None, false).await.is_err());
    }

    #[tokio::test]
    async fn test_partial_preference_update() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "ana@example.com", None, false).await.unwrap();

        let updated = update_preferences(&pool, user.id, Some(false), None).await.unwrap();
        assert!(!updated.email_reports_enabled);
        assert_eq!(updated.preferred_language, "en");

        let updated = update_preferences(&pool, user.id, None, Some("pt-BR")).await.unwrap();
        assert!(!updated.email_reports_enabled);
        assert_eq!(updated.preferred_language, "pt");
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let pool = init_memory_database().await.unwrap();
        assert!(matches!(
            update_preferences(&pool, Uuid::new_v4(), Some(true), None).await,
            Err(Error::NotFound(_))
        ));
    }
}
