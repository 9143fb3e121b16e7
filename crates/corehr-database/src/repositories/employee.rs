//! PostgreSQL employee directory implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use corehr_core::error::{AppError, ErrorKind};
use corehr_core::result::AppResult;
use corehr_core::traits::EmployeeDirectory;

/// Maximum reporting-chain depth walked by the hierarchy lookup. Guards
/// against cycles in corrupted data.
const MAX_CHAIN_DEPTH: i32 = 32;

/// Employee directory backed by the `employees` table's `manager_id`
/// self-reference.
#[derive(Debug, Clone)]
pub struct PgEmployeeDirectory {
    pool: PgPool,
}

impl PgEmployeeDirectory {
    /// Create a new directory on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for PgEmployeeDirectory {
    async fn is_manager_of(
        &self,
        manager_employee_id: Uuid,
        employee_id: Uuid,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "WITH RECURSIVE chain AS ( \
                 SELECT id, manager_id, 1 AS depth FROM employees WHERE id = $2 \
                 UNION ALL \
                 SELECT e.id, e.manager_id, c.depth + 1 \
                 FROM employees e JOIN chain c ON e.id = c.manager_id \
                 WHERE c.depth < $3 \
             ) \
             SELECT EXISTS (SELECT 1 FROM chain WHERE manager_id = $1)",
        )
        .bind(manager_employee_id)
        .bind(employee_id)
        .bind(MAX_CHAIN_DEPTH)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve reporting chain", e)
        })
    }
}
