//! Liveness and readiness for load balancers
//!
//! Unauthenticated. Answers 503 while the contract database is unreachable.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::AppState;

const SERVICE_NAME: &str = "ca-analyser";

#[derive(Debug, Serialize)]
pub struct Health {
    /// "ok" or "degraded"
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub database: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    let database_ok = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            false
        }
    };

    let (code, status, database) = if database_ok {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    let health = Health {
        status,
        module: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (Utc::now() - state.startup_time).num_seconds().max(0),
        database,
    };
    (code, Json(health))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
