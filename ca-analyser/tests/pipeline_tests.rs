//! End-to-end analysis pipeline tests
//!
//! Upload → analyze → persist → render → deliver, driven over HTTP with
//! scripted LLM replies and a recording email sender.

mod helpers;

use async_trait::async_trait;
use axum::http::StatusCode;
use ca_analyser::services::blob_store::BlobStore;
use ca_analyser::services::llm_client::{GenerateOptions, LlmError, LlmProvider};
use ca_analyser::services::report_renderer::render_report;
use ca_analyser::AppState;
use ca_common::config::ScorePolicy;
use ca_common::db::init_memory_database;
use helpers::{
    advanced_analysis, high_and_low_analysis, send, test_config, test_context, test_context_with,
    FakeEmail, FAKE_EMAIL_SECRET,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

async fn count_rows(db: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_analyze_scores_renders_and_emails() {
    let ctx = test_context().await;
    let (owner, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["result"]["compliance_score"], 82);
    assert_eq!(body["result"]["findings"].as_array().unwrap().len(), 2);
    assert_eq!(body["result"]["findings"][0]["risk_level"], "high");
    assert_eq!(body["delivery"]["status"], "sent");
    assert_eq!(body["delivery"]["message_id"], "msg_1");

    let sent = ctx.email.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec![owner.email.clone()]);
    assert!(sent[0].subject.contains("Master Services Agreement"));
    assert!(sent[0].html.contains(body["report"]["url"].as_str().unwrap().split('?').next().unwrap()));

    let report_path = body["report"]["path"].as_str().unwrap();
    let html = std::fs::read_to_string(ctx.blob_dir.path().join(report_path)).unwrap();
    assert!(html.contains("score-low-risk"));
    assert!(html.contains("Unlimited liability"));

    assert_eq!(count_rows(&ctx.state.db, "analysis_results").await, 1);
    assert_eq!(count_rows(&ctx.state.db, "findings").await, 2);
}

#[tokio::test]
async fn test_invalid_model_output_persists_nothing() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.llm.push_reply(Ok("not json".to_string()));

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INVALID_MODEL_OUTPUT");
    assert_eq!(ctx.llm.analysis_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.email.sent_count(), 0);
    assert_eq!(count_rows(&ctx.state.db, "analysis_results").await, 0);
    assert_eq!(count_rows(&ctx.state.db, "findings").await, 0);
    assert!(!ctx
        .blob_dir
        .path()
        .join(format!("reports/{}.html", contract_id))
        .exists());
}

#[tokio::test]
async fn test_transient_provider_error_is_retried() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.llm.push_reply(Err(LlmError::Provider {
        status: 503,
        body: "overloaded".to_string(),
    }));

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": false}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(ctx.llm.analysis_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rejected_credentials_are_not_retried() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.llm.push_reply(Err(LlmError::Provider {
        status: 401,
        body: r#"{"error":"Incorrect API key sk-live-SECRET123"}"#.to_string(),
    }));

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "LLM_PROVIDER_ERROR");
    assert!(!body.to_string().contains("sk-live-SECRET123"), "{}", body);
    assert_eq!(ctx.llm.analysis_calls.load(Ordering::SeqCst), 1);
    assert_eq!(count_rows(&ctx.state.db, "analysis_results").await, 0);
}

#[tokio::test]
async fn test_global_setting_suppresses_email() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let (_, admin_token) = ctx.user("admin@example.com", true).await;
    let contract_id = ctx.upload(&token, "en").await;

    let (status, _) = ctx
        .post(
            "/api/admin/settings",
            Some(&admin_token),
            json!({"global_email_reports_enabled": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": true}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery"]["status"], "skipped");
    assert_eq!(body["delivery"]["reason"], "globally_disabled");
    assert_eq!(ctx.email.sent_count(), 0);
}

#[tokio::test]
async fn test_user_opt_out_suppresses_email() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.post(
        "/api/preferences",
        Some(&token),
        json!({"email_reports_enabled": false}),
    )
    .await;

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery"]["reason"], "user_opt_out");
    assert_eq!(ctx.email.sent_count(), 0);
}

#[tokio::test]
async fn test_caller_opt_out_is_checked_first() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ca_analyser::db::settings::set_global_email_reports_enabled(&ctx.state.db, false)
        .await
        .unwrap();

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": false}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery"]["reason"], "caller_opt_out");
}

#[tokio::test]
async fn test_admin_analysis_emails_the_owner() {
    let ctx = test_context().await;
    let (owner, token) = ctx.user("owner@example.com", false).await;
    let (_, admin_token) = ctx.user("admin@example.com", true).await;
    let contract_id = ctx.upload(&token, "en").await;

    let (status, _) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&admin_token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let sent = ctx.email.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec![owner.email]);
}

#[tokio::test]
async fn test_email_failure_keeps_analysis() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.email.fail.store(true, Ordering::SeqCst);

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery"]["status"], "failed");
    assert_eq!(body["delivery"]["code"], "provider_error");
    assert!(!body.to_string().contains(FAKE_EMAIL_SECRET), "{}", body);
    assert_eq!(count_rows(&ctx.state.db, "analysis_results").await, 1);

    let (status, body) = ctx
        .post(
            "/api/reports/email",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "DELIVERY_ERROR");
    assert!(!body.to_string().contains(FAKE_EMAIL_SECRET), "{}", body);

    ctx.email.fail.store(false, Ordering::SeqCst);
    let (status, body) = ctx
        .post(
            "/api/reports/email",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "sent");
    assert_eq!(ctx.email.sent_count(), 1);
}

#[tokio::test]
async fn test_report_storage_failure_keeps_analysis() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;

    // A directory squatting on the report path makes the final rename fail
    let blocker = ctx.blob_dir.path().join(format!("reports/{}.html", contract_id));
    std::fs::create_dir_all(blocker.join("occupied")).unwrap();

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["result"]["compliance_score"], 82);
    assert!(body["report"].is_null());
    assert_eq!(body["delivery"]["status"], "failed");
    assert_eq!(body["delivery"]["code"], "storage_error");
    assert_eq!(ctx.email.sent_count(), 0);
    assert_eq!(count_rows(&ctx.state.db, "analysis_results").await, 1);

    let (status, _) = ctx
        .post(
            "/api/contracts/result",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_model_score_kept_by_default() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    let mut analysis = high_and_low_analysis();
    analysis["complianceScore"] = json!(95);
    ctx.llm.push_analysis(analysis);

    let (_, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": false}),
        )
        .await;

    assert_eq!(body["result"]["compliance_score"], 95);
}

#[tokio::test]
async fn test_recomputed_score_policy() {
    let mut config = test_config();
    config.pipeline.score_policy = ScorePolicy::Recomputed;
    let ctx = test_context_with(config).await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    let mut analysis = high_and_low_analysis();
    analysis["complianceScore"] = json!(95);
    ctx.llm.push_analysis(analysis);

    let (_, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": false}),
        )
        .await;

    assert_eq!(body["result"]["compliance_score"], 82);
}

#[tokio::test]
async fn test_non_english_output_is_localized() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "es").await;

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": false}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(ctx.llm.translation_calls.load(Ordering::SeqCst) > 0);

    let result = &body["result"];
    assert!(result["executive_summary"]
        .as_str()
        .unwrap()
        .starts_with("[translated] "));
    assert!(result["findings"][0]["title"]
        .as_str()
        .unwrap()
        .starts_with("[translated] "));
    // Identifiers stay as the model produced them
    assert_eq!(result["findings"][0]["risk_level"], "high");
    assert_eq!(result["findings"][0]["jurisdiction"], "EU");
    assert!(result["jurisdiction_summaries"]["EU"].is_object());
    assert_eq!(result["compliance_score"], 82);

    let report_path = body["report"]["path"].as_str().unwrap();
    let html = std::fs::read_to_string(ctx.blob_dir.path().join(report_path)).unwrap();
    assert!(html.contains("lang=\"es\""));
}

#[tokio::test]
async fn test_defensive_translation_can_be_disabled() {
    let mut config = test_config();
    config.pipeline.defensive_translation = false;
    let ctx = test_context_with(config).await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "es").await;

    let (status, _) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "send_email": false}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.llm.translation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_advanced_analysis_stores_redlined_clause() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.llm.push_analysis(advanced_analysis());

    let (status, body) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "advanced": true, "send_email": false}),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let result = &body["result"];
    assert_eq!(result["advanced"]["contract_type"], "Services agreement");
    assert_eq!(result["advanced"]["parties"], json!(["Acme Ltd", "Beta GmbH"]));
    let artifact_path = result["redlined_clause_artifact_path"].as_str().unwrap();
    assert!(artifact_path.starts_with(&format!("artifacts/{}/", contract_id)));
    assert!(ctx.blob_dir.path().join(artifact_path).exists());

    let (status, body) = ctx
        .post(
            "/api/artifacts/render",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artifact"]["finding_id"], result["findings"][0]["id"]);
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("<del>unlimited</del>"));
    assert!(html.contains("<ins>capped at fees paid</ins>"));

    let viewer_url = body["viewer_url"].as_str().unwrap();
    let (status, page) = ctx
        .get(viewer_url.strip_prefix("http://test.local").unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<del>unlimited</del>"));
}

#[tokio::test]
async fn test_reanalysis_replaces_previous_result() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;

    ctx.llm.push_analysis(advanced_analysis());
    let (_, first) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "advanced": true, "send_email": false}),
        )
        .await;
    let first_path = first["result"]["redlined_clause_artifact_path"]
        .as_str()
        .unwrap()
        .to_string();

    ctx.llm.push_analysis(advanced_analysis());
    let (_, second) = ctx
        .post(
            "/api/contracts/analyze",
            Some(&token),
            json!({"contract_id": contract_id, "advanced": true, "send_email": false}),
        )
        .await;
    let second_path = second["result"]["redlined_clause_artifact_path"]
        .as_str()
        .unwrap()
        .to_string();

    assert_ne!(first_path, second_path);
    assert!(!ctx.blob_dir.path().join(&first_path).exists());
    assert!(ctx.blob_dir.path().join(&second_path).exists());
    assert_eq!(count_rows(&ctx.state.db, "analysis_results").await, 1);
    assert_eq!(count_rows(&ctx.state.db, "findings").await, 2);

    let (_, latest) = ctx
        .post(
            "/api/contracts/result",
            Some(&token),
            json!({"contract_id": contract_id}),
        )
        .await;
    assert_eq!(latest["id"], second["result"]["id"]);
}

#[tokio::test]
async fn test_stored_result_renders_deterministically() {
    let ctx = test_context().await;
    let (_, token) = ctx.user("ana@example.com", false).await;
    let contract_id = ctx.upload(&token, "en").await;
    ctx.post(
        "/api/contracts/analyze",
        Some(&token),
        json!({"contract_id": contract_id, "send_email": false}),
    )
    .await;

    let id = Uuid::parse_str(&contract_id).unwrap();
    let result = ca_analyser::db::results::load_analysis(&ctx.state.db, id)
        .await
        .unwrap()
        .unwrap();

    let first = render_report(ctx.state.locale, &result, "Master Services Agreement", "en");
    let second = render_report(ctx.state.locale, &result, "Master Services Agreement", "en");
    assert_eq!(first, second);
    assert!(first.contains("score-low-risk"));
}

/// Provider that never answers within the pipeline deadline
struct StalledLlm;

#[async_trait]
impl LlmProvider for StalledLlm {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: GenerateOptions,
    ) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(high_and_low_analysis().to_string())
    }
}

#[tokio::test]
async fn test_pipeline_timeout() {
    let mut config = test_config();
    config.pipeline.timeout_secs = 1;
    let blob_dir = TempDir::new().unwrap();
    let blobs = BlobStore::new(
        blob_dir.path().to_path_buf(),
        &config.pipeline.public_base_url,
        "test-secret",
    )
    .unwrap();
    let pool = init_memory_database().await.unwrap();
    let email = Arc::new(FakeEmail::default());
    let state = AppState::new(pool, config, Arc::new(StalledLlm), email.clone(), blobs);

    let user = ca_analyser::db::users::create_user(&state.db, "ana@example.com", None, false)
        .await
        .unwrap();
    let token = ca_common::api::auth::issue_token(&state.db, user.id, None)
        .await
        .unwrap();
    let contract = ca_analyser::db::contracts::insert_contract(
        &state.db,
        user.id,
        "Master Services Agreement",
        "The Supplier's liability is unlimited.",
        Some("en"),
    )
    .await
    .unwrap();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/contracts/analyze")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(axum::body::Body::from(
            json!({"contract_id": contract.id}).to_string(),
        ))
        .unwrap();
    let (status, body) = send(ca_analyser::build_router(state.clone()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "ANALYSIS_TIMEOUT");
    assert_eq!(count_rows(&state.db, "analysis_results").await, 0);
    assert_eq!(email.sent_count(), 0);
}
