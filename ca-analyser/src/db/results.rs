//! Analysis result persistence
//!
//! An analysis is written all-or-nothing: the result row, its findings and the
//! artifact row share one transaction. Re-analyzing a contract replaces the
//! previous result (latest wins).

use super::{format_timestamp, parse_timestamp, parse_uuid};
use ca_common::models::{AnalysisResult, Finding, RedlinedClauseArtifact, RiskLevel};
use ca_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

/// Persist `result` (and its artifact row), replacing any earlier analysis
///
/// **Returns:** blob paths of artifacts that belonged to the replaced analysis,
/// so the caller can remove them.
pub async fn save_analysis(
    pool: &SqlitePool,
    result: &AnalysisResult,
    artifact: Option<&RedlinedClauseArtifact>,
) -> Result<Vec<String>> {
    // Prepare all data before opening the transaction
    let analysis_id = result.id.to_string();
    let contract_id = result.contract_id.to_string();
    let jurisdictions = serde_json::to_string(&result.jurisdiction_summaries)?;
    let advanced = result
        .advanced
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let created_at = format_timestamp(result.created_at);

    let artifact_row = match (artifact, result.redlined_clause_artifact_path.as_deref()) {
        (Some(artifact), Some(path)) => Some((artifact, path)),
        (Some(_), None) => {
            return Err(Error::InvalidInput(
                "Artifact supplied without an artifact path".to_string(),
            ))
        }
        (None, _) => None,
    };

    let mut tx = pool.begin().await?;

    let replaced_paths: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT ra.path FROM redlined_artifacts ra
        JOIN analysis_results ar ON ar.id = ra.analysis_id
        WHERE ar.contract_id = ?
        "#,
    )
    .bind(&contract_id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM analysis_results WHERE contract_id = ?")
        .bind(&contract_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO analysis_results (
            id, contract_id, executive_summary, data_protection_impact, compliance_score,
            jurisdiction_summaries, advanced, redlined_clause_artifact_path, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&analysis_id)
    .bind(&contract_id)
    .bind(&result.executive_summary)
    .bind(&result.data_protection_impact)
    .bind(result.compliance_score as i64)
    .bind(&jurisdictions)
    .bind(&advanced)
    .bind(&result.redlined_clause_artifact_path)
    .bind(&created_at)
    .execute(&mut *tx)
    .await?;

    for (position, finding) in result.findings.iter().enumerate() {
        let recommendations = serde_json::to_string(&finding.recommendations)?;
        sqlx::query(
            r#"
            INSERT INTO findings (
                id, analysis_id, position, title, description, risk_level,
                jurisdiction, category, recommendations, clause_reference
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(finding.id.to_string())
        .bind(&analysis_id)
        .bind(position as i64)
        .bind(&finding.title)
        .bind(&finding.description)
        .bind(finding.risk_level.as_str())
        .bind(&finding.jurisdiction)
        .bind(&finding.category)
        .bind(&recommendations)
        .bind(&finding.clause_reference)
        .execute(&mut *tx)
        .await?;
    }

    if let Some((artifact, path)) = artifact_row {
        sqlx::query(
            "INSERT INTO redlined_artifacts (id, analysis_id, finding_id, path, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(artifact.id.to_string())
        .bind(&analysis_id)
        .bind(artifact.finding_id.map(|id| id.to_string()))
        .bind(path)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(
        analysis_id = %result.id,
        contract_id = %result.contract_id,
        findings = result.findings.len(),
        "Saved analysis result"
    );

    Ok(replaced_paths)
}

/// Latest analysis for a contract, findings in their original order
pub async fn load_analysis(pool: &SqlitePool, contract_id: Uuid) -> Result<Option<AnalysisResult>> {
    let Some(row) = sqlx::query(
        r#"
        SELECT id, contract_id, executive_summary, data_protection_impact, compliance_score,
               jurisdiction_summaries, advanced, redlined_clause_artifact_path, created_at
        FROM analysis_results WHERE contract_id = ?
        "#,
    )
    .bind(contract_id.to_string())
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let analysis_id: String = row.get("id");
    let advanced: Option<String> = row.get("advanced");
    let score: i64 = row.get("compliance_score");

    let finding_rows = sqlx::query(
        r#"
        SELECT id, title, description, risk_level, jurisdiction, category, recommendations, clause_reference
        FROM findings WHERE analysis_id = ? ORDER BY position
        "#,
    )
    .bind(&analysis_id)
    .fetch_all(pool)
    .await?;

    let findings = finding_rows
        .iter()
        .map(|f| -> Result<Finding> {
            Ok(Finding {
                id: parse_uuid(&f.get::<String, _>("id"))?,
                title: f.get("title"),
                description: f.get("description"),
                risk_level: RiskLevel::normalize(&f.get::<String, _>("risk_level")),
                jurisdiction: f.get("jurisdiction"),
                category: f.get("category"),
                recommendations: serde_json::from_str(&f.get::<String, _>("recommendations"))?,
                clause_reference: f.get("clause_reference"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(AnalysisResult {
        id: parse_uuid(&analysis_id)?,
        contract_id: parse_uuid(&row.get::<String, _>("contract_id"))?,
        executive_summary: row.get("executive_summary"),
        data_protection_impact: row.get("data_protection_impact"),
        compliance_score: score.clamp(0, 100) as u8,
        jurisdiction_summaries: serde_json::from_str(&row.get::<String, _>("jurisdiction_summaries"))?,
        findings,
        advanced: advanced.as_deref().map(serde_json::from_str).transpose()?,
        redlined_clause_artifact_path: row.get("redlined_clause_artifact_path"),
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
    }))
}

/// Blob paths of every artifact stored for a contract
pub async fn artifact_paths(pool: &SqlitePool, contract_id: Uuid) -> Result<Vec<String>> {
    let paths = sqlx::query_scalar(
        r#"
        SELECT ra.path FROM redlined_artifacts ra
        JOIN analysis_results ar ON ar.id = ra.analysis_id
        WHERE ar.contract_id = ?
        "#,
    )
    .bind(contract_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(paths)
}
