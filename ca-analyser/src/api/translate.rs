//! Translation endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiJson, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
    /// Defaults to English
    pub source_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// POST /api/translate
///
/// Never fails on provider errors: the source text comes back instead.
pub async fn translate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TranslateRequest>,
) -> ApiResult<Json<TranslateResponse>> {
    if request.target_language.trim().is_empty() {
        return Err(ApiError::Validation("target_language is required".to_string()));
    }

    let translated_text = state
        .translator()
        .translate_text(
            &request.text,
            &request.target_language,
            request.source_language.as_deref(),
        )
        .await;

    Ok(Json(TranslateResponse { translated_text }))
}

/// Build translation routes
pub fn translate_routes() -> Router<AppState> {
    Router::new().route("/api/translate", post(translate))
}
