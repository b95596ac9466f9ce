//! Contract analysis pipeline
//!
//! One request-scoped run:
//!
//! 1. engine call (retry-wrapped)
//! 2. defensive translation of free-text fields (non-English output only)
//! 3. score policy check
//! 4. redlined artifact blob write
//! 5. single-transaction persistence
//! 6. removal of artifact blobs the new result replaced
//! 7. report render + blob write
//! 8. best-effort delivery
//!
//! Steps 1-5 run under the pipeline timeout. Persistence is the last step in
//! that window, so an expiry leaves no rows behind. Once the result is
//! committed nothing fails the run: report storage and delivery failures are
//! reported in [`PipelineOutcome::delivery`].

use super::analysis_engine::{AnalysisError, AnalysisRequest};
use super::blob_store::{BlobError, FILES_ROUTE, VIEWER_ROUTE};
use super::delivery::{DeliveryError, DeliveryStatus, DispatchOutcome, ReportDelivery};
use super::report_renderer::{render_report_with_links, ReportLinks};
use super::scoring::enforce_score_policy;
use super::translator::Translator;
use crate::db;
use crate::AppState;
use ca_common::locale::{normalize_language, DEFAULT_LANGUAGE};
use ca_common::models::{
    AnalysisResult, AppSettings, ContractDocument, RedlinedClauseArtifact, UserProfile,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Database(#[from] ca_common::Error),

    #[error("Blob storage failed: {0}")]
    Storage(#[from] BlobError),
}

/// Caller choices for one run
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub advanced: bool,
    pub send_email: bool,
}

/// Where the rendered report was stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub path: String,
    /// Time-limited signed URL
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub result: AnalysisResult,
    /// `None` when the report could not be stored
    pub report: Option<StoredReport>,
    pub delivery: DeliveryStatus,
}

/// Run the full pipeline for `contract`
///
/// `recipient` is the contract owner and `settings` the per-request snapshot
/// of the global settings row.
pub async fn run_analysis(
    state: &AppState,
    contract: &ContractDocument,
    recipient: &UserProfile,
    settings: AppSettings,
    options: AnalyzeOptions,
) -> Result<PipelineOutcome, PipelineError> {
    let timeout_secs = state.config.pipeline.timeout_secs;

    let (result, replaced) = match tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        analyze_and_persist(state, contract, options.advanced),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            error!(contract_id = %contract.id, timeout_secs, "Analysis pipeline timed out");
            return Err(AnalysisError::Timeout(timeout_secs).into());
        }
    };

    remove_replaced_blobs(state, &replaced).await;

    let (report, delivery) = match render_and_store_report(state, contract, &result).await {
        Ok(report) => {
            let delivery = DeliveryStatus::from(
                deliver_report(
                    state,
                    contract,
                    recipient,
                    settings,
                    result.compliance_score,
                    &report.url,
                    options.send_email,
                )
                .await,
            );
            (Some(report), delivery)
        }
        Err(e) => {
            error!(contract_id = %contract.id, error = %e, "Report storage failed, skipping delivery");
            let failure = DeliveryError::Storage(e.to_string());
            (None, DeliveryStatus::Failed { code: failure.code() })
        }
    };

    info!(
        contract_id = %contract.id,
        compliance_score = result.compliance_score,
        delivery = ?delivery,
        "Analysis pipeline complete"
    );

    Ok(PipelineOutcome {
        result,
        report,
        delivery,
    })
}

/// Engine → translation → scoring → artifact blob → transaction
///
/// Returns the stored result and the artifact blob paths it replaced.
async fn analyze_and_persist(
    state: &AppState,
    contract: &ContractDocument,
    advanced: bool,
) -> Result<(AnalysisResult, Vec<String>), PipelineError> {
    let request = AnalysisRequest {
        contract_text: &contract.contract_text,
        output_language: &contract.output_language,
        advanced,
    };
    let outcome = state.engine().analyze(contract.id, &request).await?;
    let mut result = outcome.result;
    let mut artifact = outcome.redlined_clause;

    let language = normalize_language(&contract.output_language);
    if state.config.pipeline.defensive_translation && language != DEFAULT_LANGUAGE {
        localize_result(&state.translator(), &mut result, artifact.as_mut(), &language).await;
    }

    enforce_score_policy(&mut result, state.config.pipeline.score_policy);

    let mut artifact_path = None;
    if let Some(artifact) = &artifact {
        let path = RedlinedClauseArtifact::storage_path(contract.id, artifact.id);
        let bytes = serde_json::to_vec(artifact).map_err(ca_common::Error::from)?;
        state.blobs.put(&path, &bytes).await?;
        result.redlined_clause_artifact_path = Some(path.clone());
        artifact_path = Some(path);
    }

    let replaced = match db::results::save_analysis(&state.db, &result, artifact.as_ref()).await {
        Ok(replaced) => replaced,
        Err(e) => {
            error!(contract_id = %contract.id, error = %e, "Persist analysis failed");
            if let Some(path) = &artifact_path {
                if let Err(cleanup) = state.blobs.delete(path).await {
                    warn!(path = %path, error = %cleanup, "Remove unsaved artifact blob failed");
                }
            }
            return Err(e.into());
        }
    };

    Ok((result, replaced))
}

async fn remove_replaced_blobs(state: &AppState, replaced: &[String]) {
    for path in replaced {
        match state.blobs.delete(path).await {
            Ok(_) => debug!(path = %path, "Removed replaced artifact blob"),
            Err(e) => warn!(path = %path, error = %e, "Remove replaced artifact blob failed"),
        }
    }
}

/// Render the stored analysis and publish it under `reports/<contract_id>.html`
pub async fn render_and_store_report(
    state: &AppState,
    contract: &ContractDocument,
    result: &AnalysisResult,
) -> Result<StoredReport, BlobError> {
    let ttl = state.signed_url_ttl();
    let links = ReportLinks {
        redlined_viewer_url: result
            .redlined_clause_artifact_path
            .as_deref()
            .map(|path| state.blobs.signed_url(VIEWER_ROUTE, path, ttl)),
    };

    let html = render_report_with_links(
        state.locale,
        result,
        &contract.name,
        &contract.output_language,
        &links,
    );

    let path = contract.report_path();
    state.blobs.put(&path, html.as_bytes()).await?;
    let url = state.blobs.signed_url(FILES_ROUTE, &path, ttl);

    info!(contract_id = %contract.id, path = %path, "Report stored");
    Ok(StoredReport { path, url })
}

/// Send (or skip) the report email for an already stored report
pub async fn deliver_report(
    state: &AppState,
    contract: &ContractDocument,
    recipient: &UserProfile,
    settings: AppSettings,
    compliance_score: u8,
    report_url: &str,
    send_email: bool,
) -> Result<DispatchOutcome, DeliveryError> {
    let delivery = ReportDelivery {
        recipient,
        settings,
        send_email,
        contract_name: &contract.name,
        compliance_score,
        report_url,
        language: &contract.output_language,
    };
    state.dispatcher().dispatch(state.locale, &delivery).await
}

/// Re-translate every free-text field into `language`
///
/// Identifiers (jurisdiction keys, categories, laws, parties, clause
/// references) are left untouched. Fields are translated concurrently and
/// written back in their original order.
pub async fn localize_result(
    translator: &Translator,
    result: &mut AnalysisResult,
    mut artifact: Option<&mut RedlinedClauseArtifact>,
    language: &str,
) {
    let mut texts = Vec::new();
    visit_free_text(result, artifact.as_deref_mut(), &mut |text: &mut String| {
        texts.push(text.clone())
    });

    debug!(fields = texts.len(), language = %language, "Translating analysis fields");
    let translated = translator.translate_all(&texts, language, None).await;

    let mut translated = translated.into_iter();
    visit_free_text(result, artifact, &mut |text: &mut String| {
        if let Some(value) = translated.next() {
            *text = value;
        }
    });
}

/// Visit free-text fields in a fixed order
fn visit_free_text(
    result: &mut AnalysisResult,
    artifact: Option<&mut RedlinedClauseArtifact>,
    f: &mut dyn FnMut(&mut String),
) {
    f(&mut result.executive_summary);
    if let Some(text) = result.data_protection_impact.as_mut() {
        f(text);
    }

    for finding in &mut result.findings {
        f(&mut finding.title);
        f(&mut finding.description);
        finding.recommendations.iter_mut().for_each(&mut *f);
    }

    for summary in result.jurisdiction_summaries.values_mut() {
        summary.key_findings.iter_mut().for_each(&mut *f);
    }

    if let Some(advanced) = result.advanced.as_mut() {
        for text in [
            &mut advanced.contract_type,
            &mut advanced.liability_cap_summary,
            &mut advanced.indemnification_clause_summary,
            &mut advanced.confidentiality_obligations_summary,
        ]
        .into_iter()
        .flatten()
        {
            f(text);
        }
    }

    if let Some(artifact) = artifact {
        f(&mut artifact.suggested_revision);
    }
}
