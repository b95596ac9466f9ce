//! CORS policy
//!
//! Only the application's own frontends may call the API from a browser.
//! Preflight requests are answered by the layer before routing, so they
//! never reach the auth middleware.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::warn;

const MAX_AGE_SECS: u64 = 3600;

/// Build the CORS layer for `allowed_origins`; unparsable entries are skipped
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(MAX_AGE_SECS))
}
