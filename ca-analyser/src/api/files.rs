//! Signed blob routes
//!
//! `GET /files/*path` serves a stored blob as-is; `GET /viewer/*path` renders
//! a stored redlined-clause artifact as HTML. Both require the `expires` and
//! `signature` query parameters produced by [`BlobStore::signed_url`]
//! instead of a bearer token, so links work from email clients.
//!
//! [`BlobStore::signed_url`]: crate::services::blob_store::BlobStore::signed_url

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use super::artifacts::load_artifact;
use crate::db;
use crate::services::artifact_renderer::render_redlined_artifact;
use crate::{ApiError, ApiResult, AppState};
use ca_common::locale::DEFAULT_LANGUAGE;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub signature: String,
}

fn verify_signed(
    state: &AppState,
    path: &str,
    query: Result<Query<SignedQuery>, QueryRejection>,
) -> ApiResult<()> {
    let Query(query) =
        query.map_err(|_| ApiError::Forbidden("Missing or malformed signature".to_string()))?;

    state
        .blobs
        .verify(path, query.expires, &query.signature, Utc::now().timestamp())
        .map_err(|e| {
            warn!(path = %path, error = %e, "Rejected signed URL");
            ApiError::from(e)
        })
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// GET /files/*path
pub async fn serve_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    query: Result<Query<SignedQuery>, QueryRejection>,
) -> ApiResult<Response> {
    verify_signed(&state, &path, query)?;

    let bytes = state.blobs.get(&path).await?;
    Ok(([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response())
}

/// GET /viewer/*path
///
/// The page language is the owning contract's output language.
pub async fn serve_viewer(
    State(state): State<AppState>,
    Path(path): Path<String>,
    query: Result<Query<SignedQuery>, QueryRejection>,
) -> ApiResult<Html<String>> {
    verify_signed(&state, &path, query)?;

    let artifact = load_artifact(&state, &path).await?;
    let language = match contract_id_from_path(&path) {
        Some(contract_id) => db::contracts::load_contract(&state.db, contract_id)
            .await?
            .map(|contract| contract.output_language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        None => DEFAULT_LANGUAGE.to_string(),
    };

    Ok(Html(render_redlined_artifact(state.locale, &artifact, &language)))
}

/// `artifacts/<contract_id>/<artifact_id>.json` → contract id
fn contract_id_from_path(path: &str) -> Option<Uuid> {
    let mut segments = path.split('/');
    match (segments.next(), segments.next()) {
        (Some("artifacts"), Some(id)) => Uuid::parse_str(id).ok(),
        _ => None,
    }
}

/// Build signed blob routes
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files/*path", get(serve_file))
        .route("/viewer/*path", get(serve_viewer))
}
