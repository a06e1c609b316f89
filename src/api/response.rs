//! Response types for the time-bank engine API.
//!
//! This module defines the error body, the `{success, data, error,
//! invalid_input}` envelope used by the computing endpoints, and the
//! mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a not found error response.
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }
}

/// The envelope returned by endpoints that compute or correct punches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// True when the operation produced `data`.
    pub success: bool,
    /// The operation's result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Why the operation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// True when the failure was caused by the request's content.
    #[serde(default)]
    pub invalid_input: bool,
}

impl<T> ApiEnvelope<T> {
    /// A successful envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            invalid_input: false,
        }
    }

    /// A failed envelope.
    pub fn failed(error: ApiError, invalid_input: bool) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            invalid_input,
        }
    }
}

/// Response body of `POST /recalc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalcResponse {
    /// True when the batch ran (individual punches may still have failed).
    pub success: bool,
    /// Punches recomputed successfully.
    pub count: usize,
    /// Per-punch failures.
    #[serde(default)]
    pub failures: Vec<crate::engine::RecalcFailure>,
    /// Why the batch could not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Wraps the error in a failed [`ApiEnvelope`] with the same status.
    pub fn into_envelope<T: Serialize>(self, invalid_input: bool) -> Response {
        (
            self.status,
            Json(ApiEnvelope::<T>::failed(self.error, invalid_input)),
        )
            .into_response()
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Validation { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid {}: {}", field, message),
                    field,
                ),
            },
            EngineError::PunchNotFound { punch_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::not_found(
                    "PUNCH_NOT_FOUND",
                    format!("Punch not found: {}", punch_id),
                ),
            },
            EngineError::Persistence {
                collection,
                message,
            } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "PERSISTENCE_ERROR",
                    format!("Could not access '{}'", collection),
                    message,
                ),
            },
            EngineError::RecomputeFailed { punch_id, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "RECOMPUTE_FAILED",
                    format!("Recompute of '{}' failed", punch_id),
                    message,
                ),
            },
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(ApiEnvelope::ok(42)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], 42);
        assert_eq!(ok["invalid_input"], false);
        assert!(ok.get("error").is_none());

        let failed = serde_json::to_value(ApiEnvelope::<u32>::failed(
            ApiError::validation_error("bad"),
            true,
        ))
        .unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["invalid_input"], true);
        assert_eq!(failed["error"]["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response: ApiErrorResponse = EngineError::validation("check_in", "bad").into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.details.as_deref(), Some("check_in"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response: ApiErrorResponse = EngineError::PunchNotFound {
            punch_id: "p1".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "PUNCH_NOT_FOUND");
    }

    #[test]
    fn test_persistence_maps_to_500() {
        let response: ApiErrorResponse = EngineError::Persistence {
            collection: "punches".to_string(),
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
