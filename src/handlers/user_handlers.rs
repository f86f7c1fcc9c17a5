use axum::extract::{Path, State};

use super::{parse_id, ApiJson};
use crate::{
    error::ApiError,
    models::{PhotoUpdate, User, UserCreate, UserUpdate},
    response::ApiResponse,
    AppState,
};

/// POST /api/users
pub async fn create_user(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<UserCreate>,
) -> Result<ApiResponse<User>, ApiError> {
    let user = app_state.user_service.create(payload).await?;
    Ok(ApiResponse::created(user).with_message("User created successfully"))
}

/// GET /api/users
pub async fn list_users(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<User>>, ApiError> {
    Ok(ApiResponse::list(app_state.user_service.list().await?))
}

/// GET /api/users/profile/:profileType
pub async fn list_users_by_profile(
    State(app_state): State<AppState>,
    Path(profile_type): Path<String>,
) -> Result<ApiResponse<Vec<User>>, ApiError> {
    let users = app_state.user_service.list_by_profile(&profile_type).await?;
    Ok(ApiResponse::list(users))
}

/// GET /api/users/:id
pub async fn get_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>, ApiError> {
    let id = parse_id(&id, "user")?;
    Ok(ApiResponse::ok(app_state.user_service.get_by_id(&id).await?))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<ApiResponse<User>, ApiError> {
    let id = parse_id(&id, "user")?;
    let user = app_state.user_service.update(&id, update).await?;
    Ok(ApiResponse::ok(user).with_message("User updated successfully"))
}

/// PUT /api/users/:id/photo
pub async fn update_user_photo(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<PhotoUpdate>,
) -> Result<ApiResponse<User>, ApiError> {
    let id = parse_id(&id, "user")?;
    let user = app_state.user_service.update_photo(&id, update).await?;
    Ok(ApiResponse::ok(user).with_message("Photo updated successfully"))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id, "user")?;
    app_state.user_service.delete(&id).await?;
    Ok(ApiResponse::<()>::message("User deleted successfully"))
}
