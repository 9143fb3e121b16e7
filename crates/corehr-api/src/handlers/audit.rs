//! Audit log review handlers.

use axum::Json;
use axum::extract::{Query, State};

use corehr_core::traits::store::AuditFilter;
use corehr_core::types::pagination::{PageRequest, PageResponse};
use corehr_entity::audit::AuditLogEntry;

use crate::dto::request::AuditQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /audit
pub async fn search_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ApiResponse<PageResponse<AuditLogEntry>>>, ApiError> {
    let filter = AuditFilter {
        user_id: query.user_id,
        action: query.action,
        resource: query.resource,
    };
    let page = PageRequest::new(query.page.unwrap_or(1), query.page_size.unwrap_or(25));

    let results = state.audit_store.search(&filter, &page).await?;
    Ok(Json(ApiResponse::ok(results)))
}
