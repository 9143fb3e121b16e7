//! PostgreSQL audit store implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use corehr_core::error::{AppError, ErrorKind};
use corehr_core::result::AppResult;
use corehr_core::traits::store::{AuditFilter, AuditStore};
use corehr_core::types::pagination::{PageRequest, PageResponse};
use corehr_entity::audit::{AuditLogEntry, NewAuditLogEntry};

/// Audit store backed by PostgreSQL. Entries are append-only; no update
/// or delete statements exist here.
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    /// Create a new store on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn create(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_log \
             (user_id, action, resource, resource_id, old_values, new_values, metadata, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(&entry.resource)
        .bind(&entry.resource_id)
        .bind(&entry.old_values)
        .bind(&entry.new_values)
        .bind(&entry.metadata)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.user_id.is_some() {
            conditions.push(format!("user_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.action.is_some() {
            conditions.push(format!("action = ${param_idx}"));
            param_idx += 1;
        }
        if filter.resource.is_some() {
            conditions.push(format!("resource = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM audit_log {where_clause}");
        let select_sql = format!(
            "SELECT * FROM audit_log {where_clause} ORDER BY created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AuditLogEntry>(&select_sql);

        if let Some(user_id) = filter.user_id {
            count_query = count_query.bind(user_id);
            select_query = select_query.bind(user_id);
        }
        if let Some(action) = filter.action {
            count_query = count_query.bind(action);
            select_query = select_query.bind(action);
        }
        if let Some(resource) = &filter.resource {
            count_query = count_query.bind(resource.clone());
            select_query = select_query.bind(resource.clone());
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
            })?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
