//! Shared fixtures for ca-analyser integration tests
//!
//! Fake providers record every call so tests can assert on side effects
//! (or their absence).

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ca_analyser::services::delivery::DeliveryError;
use ca_analyser::services::email_client::{EmailMessage, EmailReceipt, EmailSender};
use ca_analyser::services::llm_client::{GenerateOptions, LlmError, LlmProvider, ResponseFormat};
use ca_analyser::services::blob_store::BlobStore;
use ca_analyser::{build_router, AppState};
use ca_common::api::auth::issue_token;
use ca_common::config::TomlConfig;
use ca_common::db::init_memory_database;
use ca_common::models::UserProfile;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

/// LLM double: JSON requests pop scripted analysis replies, text requests
/// are "translated" by prefixing `[translated] `
#[derive(Default)]
pub struct FakeLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    pub analysis_calls: AtomicUsize,
    pub translation_calls: AtomicUsize,
}

impl FakeLlm {
    pub fn push_reply(&self, reply: Result<String, LlmError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_analysis(&self, analysis: Value) {
        self.push_reply(Ok(analysis.to_string()));
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError> {
        match options.response_format {
            ResponseFormat::Json => {
                self.analysis_calls.fetch_add(1, Ordering::SeqCst);
                self.replies
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Ok(high_and_low_analysis().to_string()))
            }
            ResponseFormat::Text => {
                self.translation_calls.fetch_add(1, Ordering::SeqCst);
                Ok(format!("[translated] {}", user_prompt))
            }
        }
    }
}

/// Appears only in the fake email provider's error body
pub const FAKE_EMAIL_SECRET: &str = "re_live_SECRET42";

/// Email double
#[derive(Default)]
pub struct FakeEmail {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: AtomicBool,
}

impl FakeEmail {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for FakeEmail {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Provider {
                status: 503,
                body: format!("unavailable, key {}", FAKE_EMAIL_SECRET),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(EmailReceipt {
            id: format!("msg_{}", sent.len()),
        })
    }
}

pub struct TestContext {
    pub state: AppState,
    pub llm: Arc<FakeLlm>,
    pub email: Arc<FakeEmail>,
    pub blob_dir: TempDir,
}

impl TestContext {
    pub fn app(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn user(&self, email: &str, admin: bool) -> (UserProfile, String) {
        let user = ca_analyser::db::users::create_user(&self.state.db, email, None, admin)
            .await
            .unwrap();
        let token = issue_token(&self.state.db, user.id, None).await.unwrap();
        (user, token)
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        send(self.app(), request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    /// Upload a contract as `token` and return its id
    pub async fn upload(&self, token: &str, language: &str) -> String {
        let (status, body) = self
            .post(
                "/api/contracts/upload",
                Some(token),
                json!({
                    "name": "Master Services Agreement",
                    "text": "1. The Supplier's liability is unlimited. 2. Payment within 90 days.",
                    "output_language": language,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
        body["contract_id"].as_str().unwrap().to_string()
    }
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

/// Test configuration: millisecond retries and a fixed public base URL
pub fn test_config() -> TomlConfig {
    let mut config = TomlConfig::default();
    config.llm.initial_delay_ms = 1;
    config.pipeline.public_base_url = "http://test.local".to_string();
    config.pipeline.timeout_secs = 30;
    config
}

pub async fn test_context_with(config: TomlConfig) -> TestContext {
    let pool = init_memory_database().await.unwrap();
    let blob_dir = TempDir::new().unwrap();
    let blobs = BlobStore::new(
        blob_dir.path().to_path_buf(),
        &config.pipeline.public_base_url,
        "test-secret",
    )
    .unwrap();

    let llm = Arc::new(FakeLlm::default());
    let email = Arc::new(FakeEmail::default());
    let state = AppState::new(pool, config, llm.clone(), email.clone(), blobs);

    TestContext {
        state,
        llm,
        email,
        blob_dir,
    }
}

pub async fn test_context() -> TestContext {
    test_context_with(test_config()).await
}

/// Model reply with one high and one low finding (score 100 - 15 - 3 = 82)
pub fn high_and_low_analysis() -> Value {
    json!({
        "executiveSummary": "The agreement exposes the supplier to unlimited liability.",
        "dataProtectionImpact": null,
        "complianceScore": 82,
        "jurisdictionSummaries": {
            "EU": {
                "applicableLaws": ["GDPR"],
                "keyFindings": ["No data processing agreement"],
                "riskLevel": "medium"
            }
        },
        "findings": [
            {
                "title": "Unlimited liability",
                "description": "Clause 1 places no cap on the supplier's liability.",
                "riskLevel": "high",
                "jurisdiction": "EU",
                "category": "Liability",
                "recommendations": ["Cap liability at twelve months of fees"],
                "clauseReference": "Clause 1"
            },
            {
                "title": "Long payment term",
                "description": "Payment is due within 90 days.",
                "riskLevel": "low",
                "jurisdiction": "EU",
                "category": "Payment",
                "recommendations": ["Shorten the term to 30 days"],
                "clauseReference": "Clause 2"
            }
        ]
    })
}

/// Advanced reply carrying metadata and a redlined clause for finding 0
pub fn advanced_analysis() -> Value {
    let mut value = high_and_low_analysis();
    let object = value.as_object_mut().unwrap();
    object.insert("effectiveDate".to_string(), json!("2024-03"));
    object.insert("contractType".to_string(), json!("Services agreement"));
    object.insert("parties".to_string(), json!(["Acme Ltd", "Beta GmbH"]));
    object.insert(
        "redlinedClause".to_string(),
        json!({
            "findingIndex": 0,
            "originalClause": "The Supplier's liability is unlimited.",
            "redlinedVersion": "The Supplier's liability is ~~unlimited~~ ++capped at fees paid++.",
            "suggestedRevision": "The Supplier's liability is capped at fees paid."
        }),
    );
    value
}
