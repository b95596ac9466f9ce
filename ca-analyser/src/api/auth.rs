//! Bearer-token authentication middleware
//!
//! Applied to protected routes only. On success the resolved
//! [`AuthenticatedUser`] is inserted as a request extension for handlers.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use ca_common::api::auth::{authenticate, parse_bearer, ApiAuthError};
use tracing::warn;

use crate::{ApiError, AppState};

pub use ca_common::api::auth::AuthenticatedUser;

/// Authentication middleware
///
/// Returns 401 for a missing, malformed, unknown or expired token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| ApiAuthError::MalformedHeader)?),
        None => None,
    };
    let token = parse_bearer(header)?;

    let user = authenticate(&state.db, token).await.map_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "Authentication failed");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
