//! Deletion policy
//!
//! A contract is removed when it is older than `retention.max_age_days` or an
//! admin marked it for deletion. Rows go first (children cascade), then the
//! report and artifact blobs. Blob removal is best effort: a failure is
//! logged and the orphan is retried by the next cleanup of the same prefix.

use super::blob_store::BlobStore;
use crate::db;
use ca_common::models::contract::report_path_for;
use ca_common::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of one cleanup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub contracts_deleted: usize,
    pub blobs_deleted: usize,
}

/// Delete a contract, its analysis rows and its blobs
///
/// **Returns:** `None` when the contract does not exist, otherwise the number
/// of blobs removed.
pub async fn delete_contract_with_blobs(
    db: &SqlitePool,
    blobs: &BlobStore,
    contract_id: Uuid,
) -> Result<Option<usize>> {
    let artifact_paths = db::results::artifact_paths(db, contract_id).await?;

    if !db::contracts::delete_contract(db, contract_id).await? {
        return Ok(None);
    }

    let mut removed = 0;
    let report = report_path_for(contract_id);
    match blobs.delete(&report).await {
        Ok(true) => removed += 1,
        Ok(false) => {}
        Err(e) => warn!(path = %report, error = %e, "Remove report blob failed"),
    }

    for path in &artifact_paths {
        match blobs.delete(path).await {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => warn!(path = %path, error = %e, "Remove artifact blob failed"),
        }
    }

    // Stray artifacts from interrupted runs live under the same prefix
    let prefix = format!("artifacts/{}", contract_id);
    if let Err(e) = blobs.delete_prefix(&prefix).await {
        warn!(prefix = %prefix, error = %e, "Remove artifact directory failed");
    }

    info!(contract_id = %contract_id, blobs_removed = removed, "Contract deleted");
    Ok(Some(removed))
}

/// Oldest creation time that survives a cleanup at `now`
///
/// Rejects ages that fall outside the representable date range.
pub fn cleanup_cutoff(max_age_days: u32, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| Error::InvalidInput(format!("max_age_days {} is out of range", max_age_days)))
}

/// Apply the deletion policy as of `now`
pub async fn run_cleanup(
    db: &SqlitePool,
    blobs: &BlobStore,
    max_age_days: u32,
    now: DateTime<Utc>,
) -> Result<CleanupReport> {
    let cutoff = cleanup_cutoff(max_age_days, now)?;
    let expired = db::contracts::list_expired(db, cutoff).await?;

    let mut report = CleanupReport::default();
    for contract_id in expired {
        if let Some(removed) = delete_contract_with_blobs(db, blobs, contract_id).await? {
            report.contracts_deleted += 1;
            report.blobs_deleted += removed;
        }
    }

    info!(
        cutoff = %cutoff,
        contracts_deleted = report.contracts_deleted,
        blobs_deleted = report.blobs_deleted,
        "Cleanup complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contracts::{insert_contract, load_contract, set_marked_for_deletion};
    use crate::db::users::create_user;
    use ca_common::db::init_memory_database;
    use tempfile::TempDir;

    async fn setup() -> (SqlitePool, BlobStore, TempDir, Uuid) {
        let pool = init_memory_database().await.unwrap();
        let dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(dir.path().to_path_buf(), "http://localhost", "secret").unwrap();
        let user = create_user(&pool, "owner@example.com", None, false).await.unwrap();
        (pool, blobs, dir, user.id)
    }

    #[tokio::test]
    async fn test_delete_removes_rows_and_blobs() {
        let (pool, blobs, _dir, user_id) = setup().await;
        let contract = insert_contract(&pool, user_id, "NDA", "text", None).await.unwrap();
        blobs.put(&contract.report_path(), b"<html></html>").await.unwrap();
        let stray = format!("artifacts/{}/orphan.json", contract.id);
        blobs.put(&stray, b"{}").await.unwrap();

        let removed = delete_contract_with_blobs(&pool, &blobs, contract.id).await.unwrap();
        assert_eq!(removed, Some(1));
        assert!(load_contract(&pool, contract.id).await.unwrap().is_none());
        assert!(blobs.get(&contract.report_path()).await.is_err());
        assert!(blobs.get(&stray).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_unknown_contract() {
        let (pool, blobs, _dir, _) = setup().await;
        assert_eq!(
            delete_contract_with_blobs(&pool, &blobs, Uuid::new_v4()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_cleanup_applies_mark_and_age() {
        let (pool, blobs, _dir, user_id) = setup().await;
        let kept = insert_contract(&pool, user_id, "Kept", "text", None).await.unwrap();
        let marked = insert_contract(&pool, user_id, "Marked", "text", None).await.unwrap();
        set_marked_for_deletion(&pool, marked.id, true).await.unwrap();

        let report = run_cleanup(&pool, &blobs, 365, Utc::now()).await.unwrap();
        assert_eq!(report.contracts_deleted, 1);
        assert!(load_contract(&pool, kept.id).await.unwrap().is_some());
        assert!(load_contract(&pool, marked.id).await.unwrap().is_none());

        // A year later the remaining contract has aged out
        let report = run_cleanup(&pool, &blobs, 365, Utc::now() + Duration::days(366))
            .await
            .unwrap();
        assert_eq!(report.contracts_deleted, 1);
        assert!(load_contract(&pool, kept.id).await.unwrap().is_none());
    }

    #[test]
    fn test_cleanup_cutoff() {
        let now = Utc::now();
        assert_eq!(cleanup_cutoff(0, now).unwrap(), now);
        assert_eq!(cleanup_cutoff(30, now).unwrap(), now - Duration::days(30));
        assert!(matches!(
            cleanup_cutoff(u32::MAX, now),
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_rejects_unrepresentable_age() {
        let (pool, blobs, _dir, user_id) = setup().await;
        let contract = insert_contract(&pool, user_id, "NDA", "text", None).await.unwrap();
        set_marked_for_deletion(&pool, contract.id, true).await.unwrap();

        let result = run_cleanup(&pool, &blobs, u32::MAX, Utc::now()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(load_contract(&pool, contract.id).await.unwrap().is_some());
    }
}
