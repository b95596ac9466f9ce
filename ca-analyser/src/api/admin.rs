//! Admin-only endpoints
//!
//! Every handler checks [`AuthenticatedUser::require_admin`] first and
//! answers 403 for other users.

use axum::{extract::State, routing::post, Extension, Json, Router};
use ca_common::api::auth::AuthenticatedUser;
use ca_common::models::AppSettings;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db;
use crate::services::retention::{run_cleanup, CleanupReport};
use crate::{ApiError, ApiJson, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    /// Omit to read the current value
    pub global_email_reports_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MarkDeletionRequest {
    pub contract_id: Uuid,
    #[serde(default = "default_marked")]
    pub marked: bool,
}

fn default_marked() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct MarkDeletionResponse {
    pub contract_id: Uuid,
    pub marked_for_deletion: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CleanupRequest {
    /// Overrides `retention.max_age_days` for this run
    pub max_age_days: Option<u32>,
}

/// POST /api/admin/settings
///
/// **Request:** `{"global_email_reports_enabled": false}` or `{}`
/// **Response:** `{"global_email_reports_enabled": false}`
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<SettingsRequest>,
) -> ApiResult<Json<AppSettings>> {
    user.require_admin()?;

    if let Some(enabled) = request.global_email_reports_enabled {
        db::settings::set_global_email_reports_enabled(&state.db, enabled).await?;
        info!(admin_id = %user.user_id, enabled, "Global email reports setting changed");
    }

    Ok(Json(db::settings::load_app_settings(&state.db).await?))
}

/// POST /api/admin/mark-deletion
pub async fn mark_deletion(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<MarkDeletionRequest>,
) -> ApiResult<Json<MarkDeletionResponse>> {
    user.require_admin()?;

    let updated =
        db::contracts::set_marked_for_deletion(&state.db, request.contract_id, request.marked).await?;
    if !updated {
        return Err(ApiError::NotFound(format!("Contract {}", request.contract_id)));
    }

    info!(
        admin_id = %user.user_id,
        contract_id = %request.contract_id,
        marked = request.marked,
        "Contract deletion mark changed"
    );
    Ok(Json(MarkDeletionResponse {
        contract_id: request.contract_id,
        marked_for_deletion: request.marked,
    }))
}

/// POST /api/admin/cleanup
///
/// Deletes contracts past the age limit or marked for deletion, together
/// with their analyses and blobs.
pub async fn cleanup(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CleanupRequest>,
) -> ApiResult<Json<CleanupReport>> {
    user.require_admin()?;

    let max_age_days = request
        .max_age_days
        .unwrap_or(state.config.retention.max_age_days);
    let report = run_cleanup(&state.db, &state.blobs, max_age_days, Utc::now()).await?;

    Ok(Json(report))
}

/// Build admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/settings", post(update_settings))
        .route("/api/admin/mark-deletion", post(mark_deletion))
        .route("/api/admin/cleanup", post(cleanup))
}
