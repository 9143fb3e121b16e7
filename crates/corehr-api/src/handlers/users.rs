//! Administrative user-management handlers. Role and ownership checks
//! happen in the guard pipeline mounted on these routes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use corehr_core::types::pagination::PageRequest;

use crate::dto::request::{ChangeRoleRequest, ChangeStatusRequest, PageQuery};
use crate::dto::response::{ApiResponse, GeneratedPasswordResponse, UserResponse};
use crate::error::ApiError;
use crate::middleware::audit::AuditValues;
use crate::state::AppState;

/// GET /auth/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(25));
    let users = state.admin_users.list_users(page).await?;

    let items: Vec<UserResponse> = users.items.iter().map(UserResponse::from).collect();
    let body = json!({
        "items": items,
        "page": users.page,
        "page_size": users.page_size,
        "total": users.total,
    });

    Ok(Json(ApiResponse::ok(body)).into_response())
}

/// GET /auth/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.admin_users.get_user(user_id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// PATCH /auth/users/{user_id}/role
pub async fn change_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> Result<Response, ApiError> {
    let before = state.admin_users.get_user(user_id).await?;
    let after = state.admin_users.change_role(user_id, req.role).await?;

    let mut response = Json(ApiResponse::ok(UserResponse::from(&after))).into_response();
    response.extensions_mut().insert(AuditValues {
        old_values: Some(json!({ "role": before.role })),
        new_values: Some(json!({ "role": after.role })),
    });
    Ok(response)
}

/// PATCH /auth/users/{user_id}/status
pub async fn change_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Response, ApiError> {
    let before = state.admin_users.get_user(user_id).await?;
    let after = state
        .admin_users
        .change_status(user_id, req.is_active)
        .await?;

    let mut response = Json(ApiResponse::ok(UserResponse::from(&after))).into_response();
    response.extensions_mut().insert(AuditValues {
        old_values: Some(json!({ "is_active": before.is_active })),
        new_values: Some(json!({ "is_active": after.is_active })),
    });
    Ok(response)
}

/// POST /auth/users/{user_id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<GeneratedPasswordResponse>>, ApiError> {
    let password = state.admin_users.reset_password(user_id).await?;
    Ok(Json(ApiResponse::ok(GeneratedPasswordResponse { password })))
}
