//! Shared API response types
//!
//! Every error leaves the service as
//! `{"error": {"code": "...", "message": "...", "details": ...}}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable identifier (e.g. `UNAUTHORIZED`)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error response envelope
///
/// # Examples
///
/// ```
/// use ca_common::api::types::ErrorResponse;
///
/// let error = ErrorResponse::new("NOT_FOUND", "Contract not found");
/// let json = serde_json::to_value(&error).unwrap();
/// assert_eq!(json["error"]["code"], "NOT_FOUND");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    /// Create new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create error response with details
    pub fn with_details(code: impl Into<String>, message: impl Into<String>, details: Value) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_omits_empty_details() {
        let error = ErrorResponse::new("VALIDATION_ERROR", "text must not be empty");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("VALIDATION_ERROR"));
        assert!(json.contains("text must not be empty"));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_error_with_details() {
        let details = serde_json::json!({ "field": "contract_id" });
        let error = ErrorResponse::with_details("VALIDATION_ERROR", "bad id", details);

        assert_eq!(error.error.code, "VALIDATION_ERROR");
        assert_eq!(error.error.details.unwrap()["field"], "contract_id");
    }
}
