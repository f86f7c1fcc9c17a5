use axum::extract::{Path, State};

use super::{parse_id, ApiJson};
use crate::{
    error::ApiError,
    models::{Case, CaseCreate, CaseUpdate},
    response::ApiResponse,
    AppState,
};

/// POST /api/cases
pub async fn create_case(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<CaseCreate>,
) -> Result<ApiResponse<Case>, ApiError> {
    let case = app_state.case_service.create(payload).await?;
    Ok(ApiResponse::created(case).with_message("Case created successfully"))
}

/// GET /api/cases
pub async fn list_cases(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<Case>>, ApiError> {
    Ok(ApiResponse::list(app_state.case_service.list().await?))
}

/// GET /api/cases/status/:status
pub async fn list_cases_by_status(
    State(app_state): State<AppState>,
    Path(status): Path<String>,
) -> Result<ApiResponse<Vec<Case>>, ApiError> {
    let cases = app_state.case_service.list_by_status(&status).await?;
    Ok(ApiResponse::list(cases))
}

/// GET /api/cases/responsible/:responsibleId/status/:status
pub async fn list_cases_by_responsible_and_status(
    State(app_state): State<AppState>,
    Path((responsible_id, status)): Path<(String, String)>,
) -> Result<ApiResponse<Vec<Case>>, ApiError> {
    let responsible_id = parse_id(&responsible_id, "user")?;
    let cases = app_state
        .case_service
        .list_by_responsible_and_status(&responsible_id, &status)
        .await?;
    Ok(ApiResponse::list(cases))
}

/// GET /api/cases/:id
pub async fn get_case(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Case>, ApiError> {
    let id = parse_id(&id, "case")?;
    Ok(ApiResponse::ok(app_state.case_service.get_by_id(&id).await?))
}

/// PUT /api/cases/:id
pub async fn update_case(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CaseUpdate>,
) -> Result<ApiResponse<Case>, ApiError> {
    let id = parse_id(&id, "case")?;
    let case = app_state.case_service.update(&id, update).await?;
    Ok(ApiResponse::ok(case).with_message("Case updated successfully"))
}

/// DELETE /api/cases/:id
pub async fn delete_case(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id, "case")?;
    app_state.case_service.delete(&id).await?;
    Ok(ApiResponse::<()>::message("Case deleted successfully"))
}
