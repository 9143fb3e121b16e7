//! Employee hierarchy lookups used by manager authorization.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Read-only view of the employee reporting hierarchy.
///
/// Employee CRUD itself is outside this subsystem; the authorization
/// pipeline only needs to answer "does this manager supervise that
/// employee". Implementations must answer for the transitive reporting
/// chain, not just direct reports.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync + 'static {
    /// Whether `manager_employee_id` appears in `employee_id`'s management
    /// chain. An employee is not considered their own manager.
    async fn is_manager_of(
        &self,
        manager_employee_id: Uuid,
        employee_id: Uuid,
    ) -> AppResult<bool>;
}
