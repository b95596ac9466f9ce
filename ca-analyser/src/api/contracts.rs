//! Contract endpoints: upload, analyze, result, delete

use axum::{extract::State, routing::post, Extension, Json, Router};
use ca_common::api::auth::AuthenticatedUser;
use ca_common::models::{AnalysisResult, ContractDocument, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::services::pipeline::{self, AnalyzeOptions, PipelineOutcome};
use crate::services::retention::delete_contract_with_blobs;
use crate::{ApiError, ApiJson, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub name: String,
    pub text: String,
    /// Defaults to English
    pub output_language: Option<String>,
}

/// Uploaded contract without its text
#[derive(Debug, Serialize)]
pub struct ContractSummary {
    pub contract_id: Uuid,
    pub name: String,
    pub output_language: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContractDocument> for ContractSummary {
    fn from(contract: ContractDocument) -> Self {
        Self {
            contract_id: contract.id,
            name: contract.name,
            output_language: contract.output_language,
            created_at: contract.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub contract_id: Uuid,
    #[serde(default)]
    pub advanced: bool,
    /// Absent means "send if the other gates allow it"
    pub send_email: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    pub contract_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub contract_id: Uuid,
    pub deleted: bool,
    pub blobs_removed: usize,
}

/// Load a contract the caller may access
///
/// Another user's contract is reported as missing, not forbidden, so ids
/// cannot be probed.
pub(crate) async fn load_owned_contract(
    state: &AppState,
    user: &AuthenticatedUser,
    contract_id: Uuid,
) -> ApiResult<ContractDocument> {
    match db::contracts::load_contract(&state.db, contract_id).await? {
        Some(contract) if user.can_access(contract.user_id) => Ok(contract),
        _ => Err(ApiError::NotFound(format!("Contract {}", contract_id))),
    }
}

/// Profile of the contract owner, who receives report emails
pub(crate) async fn load_owner(state: &AppState, contract: &ContractDocument) -> ApiResult<UserProfile> {
    db::users::load_user(&state.db, contract.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", contract.user_id)))
}

/// Latest analysis of `contract`
pub(crate) async fn load_result(state: &AppState, contract: &ContractDocument) -> ApiResult<AnalysisResult> {
    db::results::load_analysis(&state.db, contract.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No analysis for contract {}", contract.id)))
}

/// POST /api/contracts/upload
///
/// **Request:** `{"name": "NDA", "text": "...", "output_language": "es"}`
/// **Response:** `{"contract_id": "...", "name": "NDA", "output_language": "es", "created_at": "..."}`
pub async fn upload_contract(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<UploadRequest>,
) -> ApiResult<Json<ContractSummary>> {
    let contract = db::contracts::insert_contract(
        &state.db,
        user.user_id,
        &request.name,
        &request.text,
        request.output_language.as_deref(),
    )
    .await?;

    info!(
        contract_id = %contract.id,
        user_id = %user.user_id,
        chars = contract.contract_text.len(),
        "Contract uploaded"
    );
    Ok(Json(contract.into()))
}

/// POST /api/contracts/analyze
///
/// Runs the full pipeline: analysis, translation, scoring, persistence,
/// report storage and email delivery.
///
/// **Errors:**
/// - 400: blank contract text
/// - 404: unknown contract, or not the caller's
/// - 500: provider failure after retries, unparsable model output, timeout
///
/// Delivery problems are reported in the `delivery` field, never as an error.
pub async fn analyze_contract(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<PipelineOutcome>> {
    let contract = load_owned_contract(&state, &user, request.contract_id).await?;
    let recipient = load_owner(&state, &contract).await?;
    let settings = db::settings::load_app_settings(&state.db).await?;

    let options = AnalyzeOptions {
        advanced: request.advanced,
        send_email: request.send_email.unwrap_or(true),
    };
    let outcome = pipeline::run_analysis(&state, &contract, &recipient, settings, options).await?;

    Ok(Json(outcome))
}

/// POST /api/contracts/result
pub async fn get_result(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<ContractRequest>,
) -> ApiResult<Json<AnalysisResult>> {
    let contract = load_owned_contract(&state, &user, request.contract_id).await?;
    Ok(Json(load_result(&state, &contract).await?))
}

/// POST /api/contracts/delete
///
/// Owner or admin. Removes the contract, its analysis rows and its blobs.
pub async fn delete_contract(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<ContractRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let contract = load_owned_contract(&state, &user, request.contract_id).await?;

    let blobs_removed = delete_contract_with_blobs(&state.db, &state.blobs, contract.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Contract {}", contract.id)))?;

    Ok(Json(DeleteResponse {
        contract_id: contract.id,
        deleted: true,
        blobs_removed,
    }))
}

/// Build contract routes
pub fn contract_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contracts/upload", post(upload_contract))
        .route("/api/contracts/analyze", post(analyze_contract))
        .route("/api/contracts/result", post(get_result))
        .route("/api/contracts/delete", post(delete_contract))
}
