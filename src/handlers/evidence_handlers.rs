use axum::extract::{Path, State};

use super::{parse_case_id, parse_id, ApiJson};
use crate::{
    error::ApiError,
    models::{
        DocumentAttachmentCreate, Evidence, EvidenceCreate, EvidenceUpdate,
        ImageAttachmentCreate,
    },
    response::ApiResponse,
    AppState,
};

/// POST /api/evidence
pub async fn create_evidence(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<EvidenceCreate>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let evidence = app_state.evidence_service.create(payload).await?;
    Ok(ApiResponse::created(evidence).with_message("Evidence created successfully"))
}

/// POST /api/evidence/bulk
pub async fn create_many_evidence(
    State(app_state): State<AppState>,
    ApiJson(payloads): ApiJson<Vec<EvidenceCreate>>,
) -> Result<ApiResponse<Vec<Evidence>>, ApiError> {
    let created = app_state.evidence_service.create_many(payloads).await?;
    let count = created.len();
    Ok(ApiResponse::created(created)
        .with_count(count)
        .with_message(format!("{} evidence records created", count)))
}

/// GET /api/evidence
pub async fn list_evidence(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<Evidence>>, ApiError> {
    let evidence = app_state.evidence_service.list().await?;
    Ok(ApiResponse::list(evidence))
}

/// GET /api/evidence/:id
pub async fn get_evidence(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let evidence = app_state.evidence_service.get_by_id(&id).await?;
    Ok(ApiResponse::ok(evidence))
}

/// GET /api/evidence/case/:caseId
pub async fn list_evidence_by_case(
    State(app_state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<ApiResponse<Vec<Evidence>>, ApiError> {
    let case_id = parse_case_id(&case_id)?;
    let evidence = app_state.evidence_service.list_by_case(case_id).await?;
    Ok(ApiResponse::list(evidence))
}

/// PUT /api/evidence/:id
pub async fn update_evidence(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<EvidenceUpdate>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let evidence = app_state.evidence_service.update(&id, update).await?;
    Ok(ApiResponse::ok(evidence).with_message("Evidence updated successfully"))
}

/// DELETE /api/evidence/:id
pub async fn delete_evidence(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    app_state.evidence_service.delete(&id).await?;
    Ok(ApiResponse::<()>::message("Evidence deleted successfully"))
}

/// DELETE /api/evidence/clear-all
pub async fn delete_all_evidence(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<()>, ApiError> {
    let removed = app_state.evidence_service.delete_all().await?;
    Ok(ApiResponse::<()>::message(format!("{} evidence records deleted", removed))
        .with_count(usize::try_from(removed).unwrap_or(usize::MAX)))
}

/// PUT /api/evidence/:id/radiograph
pub async fn add_radiograph(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ImageAttachmentCreate>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let evidence = app_state.evidence_service.add_radiograph(&id, payload).await?;
    Ok(ApiResponse::ok(evidence).with_message("Radiograph added successfully"))
}

/// PUT /api/evidence/:id/odontogram
pub async fn add_odontogram(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<ImageAttachmentCreate>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let evidence = app_state.evidence_service.add_odontogram(&id, payload).await?;
    Ok(ApiResponse::ok(evidence).with_message("Odontogram added successfully"))
}

/// PUT /api/evidence/:id/document
pub async fn add_document(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<DocumentAttachmentCreate>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let evidence = app_state.evidence_service.add_document(&id, payload).await?;
    Ok(ApiResponse::ok(evidence).with_message("Document added successfully"))
}

/// DELETE /api/evidence/:id/radiograph/:subId
pub async fn remove_radiograph(
    State(app_state): State<AppState>,
    Path((id, sub_id)): Path<(String, String)>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let sub_id = parse_id(&sub_id, "radiograph")?;
    let evidence = app_state
        .evidence_service
        .remove_radiograph(&id, &sub_id)
        .await?;
    Ok(ApiResponse::ok(evidence).with_message("Radiograph removed successfully"))
}

/// DELETE /api/evidence/:id/odontogram/:subId
pub async fn remove_odontogram(
    State(app_state): State<AppState>,
    Path((id, sub_id)): Path<(String, String)>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let sub_id = parse_id(&sub_id, "odontogram")?;
    let evidence = app_state
        .evidence_service
        .remove_odontogram(&id, &sub_id)
        .await?;
    Ok(ApiResponse::ok(evidence).with_message("Odontogram removed successfully"))
}

/// DELETE /api/evidence/:id/document/:subId
pub async fn remove_document(
    State(app_state): State<AppState>,
    Path((id, sub_id)): Path<(String, String)>,
) -> Result<ApiResponse<Evidence>, ApiError> {
    let id = parse_id(&id, "evidence")?;
    let sub_id = parse_id(&sub_id, "document")?;
    let evidence = app_state
        .evidence_service
        .remove_document(&id, &sub_id)
        .await?;
    Ok(ApiResponse::ok(evidence).with_message("Document removed successfully"))
}
