//! Report endpoints: render and email

use axum::{extract::State, routing::post, Extension, Json, Router};
use ca_common::api::auth::AuthenticatedUser;
use serde::Deserialize;
use uuid::Uuid;

use super::contracts::{load_owned_contract, load_owner, load_result};
use crate::db;
use crate::services::delivery::{DeliveryError, DeliveryStatus};
use crate::services::pipeline::{self, StoredReport};
use crate::{ApiJson, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RenderReportRequest {
    pub contract_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EmailReportRequest {
    pub contract_id: Uuid,
    pub send_email: Option<bool>,
}

/// POST /api/reports/render
///
/// Renders the latest analysis, stores it and returns a signed link.
pub async fn render_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<RenderReportRequest>,
) -> ApiResult<Json<StoredReport>> {
    let contract = load_owned_contract(&state, &user, request.contract_id).await?;
    let result = load_result(&state, &contract).await?;

    let report = pipeline::render_and_store_report(&state, &contract, &result).await?;
    Ok(Json(report))
}

/// POST /api/reports/email
///
/// **Response:** `{"status": "sent", "message_id": "..."}` or
/// `{"status": "skipped", "reason": "user_opt_out"}`
///
/// **Errors:**
/// - 404: unknown contract or no analysis yet
/// - 502: email provider rejected the message
pub async fn email_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<EmailReportRequest>,
) -> ApiResult<Json<DeliveryStatus>> {
    let contract = load_owned_contract(&state, &user, request.contract_id).await?;
    let result = load_result(&state, &contract).await?;
    let recipient = load_owner(&state, &contract).await?;
    let settings = db::settings::load_app_settings(&state.db).await?;

    let report = pipeline::render_and_store_report(&state, &contract, &result).await?;
    let outcome = pipeline::deliver_report(
        &state,
        &contract,
        &recipient,
        settings,
        result.compliance_score,
        &report.url,
        request.send_email.unwrap_or(true),
    )
    .await?;

    Ok(Json(DeliveryStatus::from(Ok::<_, DeliveryError>(outcome))))
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/render", post(render_report))
        .route("/api/reports/email", post(email_report))
}
