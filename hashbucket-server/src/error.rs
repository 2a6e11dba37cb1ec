//! Error types for the HTTP API

use crate::api::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hashbucket_core::HashError;
use std::fmt;

/// Message returned when a prediction request has no usable `feature_value`
pub const FEATURE_VALUE_REQUIRED: &str = "feature_value is required";

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Request failed validation (400)
    Validation(String),

    /// Hashing rejected its arguments (500)
    Hashing(HashError),

    /// Internal server error (500)
    Internal(String),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// The validation error for a missing `feature_value`
    pub fn missing_feature_value() -> Self {
        ApiError::Validation(FEATURE_VALUE_REQUIRED.to_string())
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Hashing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Hashing(_) => "hashing",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "{}", msg),
            ApiError::Hashing(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Hashing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        ApiError::Hashing(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        crate::metrics::record_error(self.kind());

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Prediction failed: {}", self);
        } else {
            tracing::debug!(kind = self.kind(), "Rejected request: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::missing_feature_value().to_string(),
            "feature_value is required"
        );
        assert_eq!(
            ApiError::Internal("serialization failed".to_string()).to_string(),
            "serialization failed"
        );
        let err: ApiError = HashError::invalid_argument("bad buckets").into();
        assert_eq!(err.to_string(), "Invalid argument: bad buckets");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::missing_feature_value().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(HashError::invalid_argument("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;
        let err = ApiError::from(HashError::invalid_argument("x"));
        assert!(err.source().is_some());
        assert!(ApiError::missing_feature_value().source().is_none());
    }

    #[tokio::test]
    async fn test_validation_into_response() {
        let response = ApiError::missing_feature_value().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({"error": "feature_value is required"}));
    }

    #[tokio::test]
    async fn test_hashing_into_response() {
        let err = ApiError::from(HashError::invalid_argument(
            "num_buckets must be a positive integer, got 0",
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("num_buckets must be a positive integer"));
    }

    #[tokio::test]
    async fn test_internal_into_response() {
        let response = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "boom");
    }
}
