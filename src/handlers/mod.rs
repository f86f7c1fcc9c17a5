pub mod case_handlers;
pub mod evidence_handlers;
pub mod health_handlers;
pub mod user_handlers;

use axum::{extract::FromRequest, http::Uri};
use uuid::Uuid;

use crate::error::ApiError;

pub use health_handlers::{health_check, liveness_check};

/// JSON body extractor whose rejections render as the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a store identifier taken from the path.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("Invalid {} id '{}'", what, raw)))
}

/// Parse a numeric case number taken from the path.
pub(crate) fn parse_case_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid caseId '{}'", raw)))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
