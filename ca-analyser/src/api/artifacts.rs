//! Redlined clause artifact endpoint

use axum::{extract::State, routing::post, Extension, Json, Router};
use ca_common::api::auth::AuthenticatedUser;
use ca_common::locale::normalize_language;
use ca_common::models::RedlinedClauseArtifact;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contracts::{load_owned_contract, load_result};
use crate::services::artifact_renderer::render_redlined_artifact;
use crate::services::blob_store::VIEWER_ROUTE;
use crate::{ApiError, ApiJson, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RenderArtifactRequest {
    pub contract_id: Uuid,
    /// Defaults to the contract's output language
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderArtifactResponse {
    pub artifact: RedlinedClauseArtifact,
    pub html: String,
    /// Signed link to the same page served by `/viewer`
    pub viewer_url: String,
}

/// Read and decode a stored artifact blob
pub(crate) async fn load_artifact(state: &AppState, path: &str) -> ApiResult<RedlinedClauseArtifact> {
    let bytes = state.blobs.get(path).await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Internal(format!("Corrupt artifact {}: {}", path, e)))
}

/// POST /api/artifacts/render
pub async fn render_artifact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<RenderArtifactRequest>,
) -> ApiResult<Json<RenderArtifactResponse>> {
    let contract = load_owned_contract(&state, &user, request.contract_id).await?;
    let result = load_result(&state, &contract).await?;
    let path = result
        .redlined_clause_artifact_path
        .ok_or_else(|| ApiError::NotFound(format!("No redlined clause for contract {}", contract.id)))?;

    let artifact = load_artifact(&state, &path).await?;
    let language = normalize_language(
        request
            .language
            .as_deref()
            .unwrap_or(&contract.output_language),
    );
    let html = render_redlined_artifact(state.locale, &artifact, &language);
    let viewer_url = state
        .blobs
        .signed_url(VIEWER_ROUTE, &path, state.signed_url_ttl());

    Ok(Json(RenderArtifactResponse {
        artifact,
        html,
        viewer_url,
    }))
}

/// Build artifact routes
pub fn artifact_routes() -> Router<AppState> {
    Router::new().route("/api/artifacts/render", post(render_artifact))
}
