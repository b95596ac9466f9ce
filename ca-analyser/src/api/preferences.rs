//! User preference endpoint

use axum::{extract::State, routing::post, Extension, Json, Router};
use ca_common::api::auth::AuthenticatedUser;
use ca_common::models::UserProfile;
use serde::Deserialize;
use tracing::info;

use crate::db;
use crate::{ApiJson, ApiResult, AppState};

/// Absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub email_reports_enabled: Option<bool>,
    pub preferred_language: Option<String>,
}

/// POST /api/preferences
///
/// Updates the caller's own profile and returns it.
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<PreferencesRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = db::users::update_preferences(
        &state.db,
        user.user_id,
        request.email_reports_enabled,
        request.preferred_language.as_deref(),
    )
    .await?;

    info!(
        user_id = %profile.id,
        email_reports_enabled = profile.email_reports_enabled,
        preferred_language = %profile.preferred_language,
        "Preferences updated"
    );
    Ok(Json(profile))
}

/// Build preference routes
pub fn preference_routes() -> Router<AppState> {
    Router::new().route("/api/preferences", post(update_preferences))
}
