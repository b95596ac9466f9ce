//! ca-analyser library interface
//!
//! Exposes the router, state and pipeline services for the binary and for
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiJson, ApiResult};

use axum::Router;
use ca_common::config::TomlConfig;
use ca_common::{Locale, RetryPolicy};
use chrono::{DateTime, Utc};
use services::analysis_engine::AnalysisEngine;
use services::blob_store::BlobStore;
use services::delivery::DeliveryDispatcher;
use services::email_client::EmailSender;
use services::llm_client::LlmProvider;
use services::translator::Translator;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
///
/// Providers are trait objects so tests can inject fakes.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub config: Arc<TomlConfig>,
    pub llm: Arc<dyn LlmProvider>,
    pub email: Arc<dyn EmailSender>,
    pub blobs: Arc<BlobStore>,
    /// Message tables for reports and emails
    pub locale: &'static Locale,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: TomlConfig,
        llm: Arc<dyn LlmProvider>,
        email: Arc<dyn EmailSender>,
        blobs: BlobStore,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            llm,
            email,
            blobs: Arc::new(blobs),
            locale: Locale::builtin(),
            startup_time: Utc::now(),
        }
    }

    /// Backoff for LLM calls, from `[llm]`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.config.llm.max_attempts,
            Duration::from_millis(self.config.llm.initial_delay_ms),
        )
    }

    pub fn engine(&self) -> AnalysisEngine {
        AnalysisEngine::new(
            self.llm.clone(),
            self.retry_policy(),
            self.config.llm.temperature,
        )
    }

    pub fn translator(&self) -> Translator {
        Translator::new(self.llm.clone(), self.retry_policy())
    }

    pub fn dispatcher(&self) -> DeliveryDispatcher {
        DeliveryDispatcher::new(self.email.clone(), self.config.email.from_address.clone())
    }

    /// Lifetime of signed report and viewer links
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.config.pipeline.signed_url_ttl_secs)
    }
}

/// Build application router
///
/// `/api/*` routes require a bearer token; `/health` and the signed
/// `/files` and `/viewer` routes do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    // Protected routes (require authentication)
    let protected = Router::new()
        .merge(api::contract_routes())
        .merge(api::report_routes())
        .merge(api::artifact_routes())
        .merge(api::translate_routes())
        .merge(api::preference_routes())
        .merge(api::admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no bearer token)
    let public = Router::new()
        .merge(api::health_routes())
        .merge(api::file_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(api::cors_layer(&state.config.server.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
