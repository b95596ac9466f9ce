//! Error types for ca-analyser
//!
//! Every failure leaves the service as
//! `{"error": {"code": "...", "message": "..."}}` with a status from the
//! taxonomy below. Provider errors are logged where they occur and converted
//! here; raw provider bodies are never forwarded to callers.

use crate::services::analysis_engine::AnalysisError;
use crate::services::blob_store::BlobError;
use crate::services::delivery::DeliveryError;
use crate::services::pipeline::PipelineError;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ca_common::api::{ApiAuthError, ErrorResponse};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, invalid or expired credential (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// LLM call or parse failure (500; blank contract text is 400)
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Email or storage provider failure (502)
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Analysis(AnalysisError::EmptyContract) => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Delivery(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Analysis(AnalysisError::EmptyContract) => "EMPTY_CONTRACT",
            ApiError::Analysis(AnalysisError::Provider(_)) => "LLM_PROVIDER_ERROR",
            ApiError::Analysis(AnalysisError::InvalidModelOutput(_)) => "INVALID_MODEL_OUTPUT",
            ApiError::Analysis(AnalysisError::Timeout(_)) => "ANALYSIS_TIMEOUT",
            ApiError::Delivery(DeliveryError::Storage(_)) => "STORAGE_ERROR",
            ApiError::Delivery(_) => "DELIVERY_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message sent to the caller
    ///
    /// Provider, storage and internal failures get a fixed text per code; the
    /// underlying error only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Analysis(AnalysisError::Provider(_)) => {
                "The analysis provider could not complete the request".to_string()
            }
            ApiError::Analysis(AnalysisError::InvalidModelOutput(_)) => {
                "The analysis provider returned an unreadable result".to_string()
            }
            ApiError::Delivery(DeliveryError::Storage(_)) => "Report storage failed".to_string(),
            ApiError::Delivery(_) => "The email provider could not deliver the report".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let body = Json(ErrorResponse::new(self.code(), self.public_message()));
        (status, body).into_response()
    }
}

impl From<ca_common::Error> for ApiError {
    fn from(err: ca_common::Error) -> Self {
        match err {
            ca_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            ca_common::Error::InvalidInput(msg) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ApiAuthError> for ApiError {
    fn from(err: ApiAuthError) -> Self {
        if err.is_unauthenticated() {
            ApiError::Unauthorized(err.to_string())
        } else if err == ApiAuthError::NotAdmin {
            ApiError::Forbidden(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match &err {
            BlobError::NotFound(path) => ApiError::NotFound(format!("File {}", path)),
            BlobError::InvalidPath(path) => ApiError::Validation(format!("Invalid path: {}", path)),
            BlobError::InvalidSignature | BlobError::Expired => ApiError::Forbidden(err.to_string()),
            BlobError::Io(e) => ApiError::Delivery(DeliveryError::Storage(e.to_string())),
            BlobError::SigningKey(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Analysis(e) => ApiError::Analysis(e),
            PipelineError::Database(e) => e.into(),
            PipelineError::Storage(e) => ApiError::Delivery(DeliveryError::Storage(e.to_string())),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor whose rejections use the API error envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_client::LlmError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Delivery(DeliveryError::NotConfigured).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_analysis_errors() {
        let empty = ApiError::from(AnalysisError::EmptyContract);
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

        let invalid = ApiError::from(AnalysisError::InvalidModelOutput("not json".into()));
        assert_eq!(invalid.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(invalid.code(), "INVALID_MODEL_OUTPUT");

        let provider = ApiError::from(AnalysisError::Provider(LlmError::Timeout));
        assert_eq!(provider.code(), "LLM_PROVIDER_ERROR");
    }

    #[test]
    fn test_auth_error_classification() {
        assert_eq!(
            ApiError::from(ApiAuthError::MissingToken).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::from(ApiAuthError::NotAdmin).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(ApiAuthError::DatabaseError("locked".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_common_error_mapping() {
        let err = ApiError::from(ca_common::Error::InvalidInput("name".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = ApiError::from(ca_common::Error::NotFound("contract".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_provider_details_stay_out_of_message() {
        let llm = ApiError::from(AnalysisError::Provider(LlmError::Provider {
            status: 401,
            body: "Incorrect API key sk-live-1234".into(),
        }));
        assert_eq!(llm.code(), "LLM_PROVIDER_ERROR");
        assert!(!llm.public_message().contains("sk-live-1234"));
        assert!(llm.to_string().contains("sk-live-1234"));

        let email = ApiError::from(DeliveryError::Provider {
            status: 503,
            body: "upstream token re_abc".into(),
        });
        assert_eq!(email.code(), "DELIVERY_ERROR");
        assert!(!email.public_message().contains("re_abc"));

        let internal = ApiError::Internal("database is locked at /srv/ca/ca.db".into());
        assert_eq!(internal.public_message(), "Internal server error");
    }

    #[test]
    fn test_signed_url_failures_are_forbidden() {
        assert_eq!(ApiError::from(BlobError::Expired).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::from(BlobError::InvalidSignature).status(),
            StatusCode::FORBIDDEN
        );
    }
}
