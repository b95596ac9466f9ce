//! HTTP API handlers for ca-analyser
//!
//! Every `/api/*` operation is a POST with a JSON body and a bearer token.
//! Responses are JSON; errors use the `{"error": {...}}` envelope.

pub mod admin;
pub mod artifacts;
pub mod auth;
pub mod contracts;
pub mod cors;
pub mod files;
pub mod health;
pub mod preferences;
pub mod reports;
pub mod translate;

pub use admin::admin_routes;
pub use artifacts::artifact_routes;
pub use auth::auth_middleware;
pub use contracts::contract_routes;
pub use cors::cors_layer;
pub use files::file_routes;
pub use health::health_routes;
pub use preferences::preference_routes;
pub use reports::report_routes;
pub use translate::translate_routes;
