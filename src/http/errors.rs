//! Maps `GatewayError` to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::GatewayError;

/// Standard API error response body.
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error name
    pub code: String,
    pub message: String,
    /// Field or resource at fault
    pub target: String,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::FieldMissing { .. }
            | GatewayError::FieldTypeMismatch { .. }
            | GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Resource { .. } => StatusCode::NOT_FOUND,
            GatewayError::Executor(_) => StatusCode::BAD_GATEWAY,
            GatewayError::StorageFailure(_)
            | GatewayError::Database(_)
            | GatewayError::Io(_)
            | GatewayError::Config(_)
            | GatewayError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        let body = ApiErrorResponse {
            error: ApiErrorDetail {
                code: self.name().to_string(),
                message: self.to_string(),
                target: self.target().to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::field_missing("file").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::type_mismatch("threshold", "x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::validation("request body", "x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::resource("url", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::Executor("down".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Config("bad".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = GatewayError::type_mismatch("threshold", "threshold must be a float value")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": {
                    "code": "FieldTypeMismatch",
                    "message": "threshold must be a float value",
                    "target": "threshold"
                }
            })
        );
    }
}
