use axum::extract::State;
use serde_json::{json, Value};

use crate::{error::ApiError, response::ApiResponse, AppState};

/// Health check including store connectivity
pub async fn health_check(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Value>, ApiError> {
    if let Err(e) = app_state.store.ping().await {
        tracing::error!("Store health check failed: {}", e);
        return Err(ApiError::internal(format!("Service is unhealthy: {}", e)));
    }

    Ok(ApiResponse::ok(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "store": app_state.config.store_backend,
    })))
}

/// Liveness probe; does not touch the store.
pub async fn liveness_check() -> ApiResponse<Value> {
    ApiResponse::ok(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
