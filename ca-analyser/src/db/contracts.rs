//! Contract document operations

use super::{format_timestamp, parse_timestamp, parse_uuid};
use ca_common::locale::normalize_language;
use ca_common::models::ContractDocument;
use ca_common::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn contract_from_row(row: &SqliteRow) -> Result<ContractDocument> {
    Ok(ContractDocument {
        id: parse_uuid(&row.get::<String, _>("id"))?,
        user_id: parse_uuid(&row.get::<String, _>("user_id"))?,
        name: row.get("name"),
        contract_text: row.get("contract_text"),
        output_language: row.get("output_language"),
        marked_for_deletion: row.get("marked_for_deletion"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    })
}

/// Store an uploaded contract
pub async fn insert_contract(
    pool: &SqlitePool,
    user_id: Uuid,
    name: &str,
    contract_text: &str,
    output_language: Option<&str>,
) -> Result<ContractDocument> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Contract name is required".to_string()));
    }
    if contract_text.trim().is_empty() {
        return Err(Error::InvalidInput("Contract text is required".to_string()));
    }

    let contract = ContractDocument {
        id: Uuid::new_v4(),
        user_id,
        name: name.trim().to_string(),
        contract_text: contract_text.to_string(),
        output_language: normalize_language(output_language.unwrap_or_default()),
        marked_for_deletion: false,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO contracts (id, user_id, name, contract_text, output_language, marked_for_deletion, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(contract.id.to_string())
    .bind(contract.user_id.to_string())
    .bind(&contract.name)
    .bind(&contract.contract_text)
    .bind(&contract.output_language)
    .bind(format_timestamp(contract.created_at))
    .execute(pool)
    .await?;

    Ok(contract)
}

pub async fn load_contract(pool: &SqlitePool, contract_id: Uuid) -> Result<Option<ContractDocument>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, name, contract_text, output_language, marked_for_deletion, created_at
        FROM contracts WHERE id = ?
        "#,
    )
    .bind(contract_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(contract_from_row).transpose()
}

/// Delete a contract; results, findings and artifact rows cascade
pub async fn delete_contract(pool: &SqlitePool, contract_id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM contracts WHERE id = ?")
        .bind(contract_id.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

/// Flag (or unflag) a contract for removal by the next cleanup
pub async fn set_marked_for_deletion(pool: &SqlitePool, contract_id: Uuid, marked: bool) -> Result<bool> {
    let updated = sqlx::query("UPDATE contracts SET marked_for_deletion = ? WHERE id = ?")
        .bind(marked)
        .bind(contract_id.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    Ok(updated > 0)
}

/// Contracts created before `cutoff` or marked for deletion
pub async fn list_expired(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT id FROM contracts WHERE marked_for_deletion = 1 OR created_at < ? ORDER BY created_at",
    )
    .bind(format_timestamp(cutoff))
    .fetch_all(pool)
    .await?;

    ids.iter().map(|id| parse_uuid(id)).collect()
}
