use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::response::ApiResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Prefix the message of a client-facing error, leaving server errors untouched.
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{prefix}: {msg}")),
            Self::NotFound(msg) => Self::NotFound(format!("{prefix}: {msg}")),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to clients. Server-side failures surface the raw cause.
    fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::Internal(msg) => msg.clone(),
            Self::Database(err) => err.to_string(),
            Self::Migration(err) => err.to_string(),
            Self::Config(err) => err.to_string(),
            Self::Serialization(err) => err.to_string(),
            Self::Io(err) => err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();
        let message = self.client_message();

        match &self {
            ApiError::Validation(msg) => {
                tracing::warn!(error_id = %error_id, error = %msg, "validation error occurred");
            }
            ApiError::NotFound(msg) => {
                tracing::info!(error_id = %error_id, error = %msg, "resource not found");
            }
            ApiError::Database(err) => {
                tracing::error!(error_id = %error_id, error = %err, "database error occurred");
            }
            ApiError::Migration(err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "database migration error occurred"
                );
            }
            other => {
                tracing::error!(error_id = %error_id, error = %other, "internal server error occurred");
            }
        }

        ApiResponse::<()>::failure(status, message).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn validation_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::validation("Radiograph image is required"))
    }

    async fn not_found_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::not_found("Evidence not found"))
    }

    async fn internal_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::internal("connection reset by peer"))
    }

    async fn call(handler_app: Router) -> (StatusCode, Value) {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = handler_app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let (status, json) = call(Router::new().route("/test", get(validation_handler))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Radiograph image is required");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_not_found_error_response() {
        let (status, json) = call(Router::new().route("/test", get(not_found_handler))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Evidence not found");
    }

    #[tokio::test]
    async fn test_internal_error_keeps_raw_message() {
        let (status, json) = call(Router::new().route("/test", get(internal_handler))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "connection reset by peer");
    }

    #[test]
    fn test_prefixed_only_touches_client_errors() {
        let err = ApiError::not_found("Case 3 not found").prefixed("item 1");
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "item 1: Case 3 not found"));

        let err = ApiError::internal("boom").prefixed("item 1");
        assert!(matches!(err, ApiError::Internal(ref m) if m == "boom"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(ApiError::validation("x"), ApiError::Validation(_)));
        assert!(matches!(ApiError::not_found("x"), ApiError::NotFound(_)));
        assert!(matches!(ApiError::internal("x"), ApiError::Internal(_)));
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
