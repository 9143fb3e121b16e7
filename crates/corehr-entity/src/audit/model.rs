//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// The category of a recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// A read of a protected resource.
    Access,
    /// Creation of a resource.
    Create,
    /// Mutation of an existing resource.
    Update,
    /// Deletion of a resource.
    Delete,
}

impl AuditAction {
    /// Return the action as its canonical uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "ACCESS",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable audit log entry recording a completed, successful operation.
///
/// Entries are append-only; nothing in the application mutates or deletes
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The user who performed the action, when authenticated.
    pub user_id: Option<Uuid>,
    /// The category of the action.
    pub action: AuditAction,
    /// The kind of resource acted upon (e.g. `"user"`, `"session"`).
    pub resource: String,
    /// The specific resource identifier, if the route carries one.
    pub resource_id: Option<String>,
    /// Resource state before the operation, when the call site supplies it.
    pub old_values: Option<serde_json::Value>,
    /// Resource state after the operation, when the call site supplies it.
    pub new_values: Option<serde_json::Value>,
    /// Request metadata: method, path, query, user agent.
    pub metadata: Option<serde_json::Value>,
    /// IP address of the caller.
    pub ip_address: Option<String>,
    /// User-Agent header of the caller.
    pub user_agent: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data captured for a new audit log entry before it is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditLogEntry {
    /// The user who performed the action, when authenticated.
    pub user_id: Option<Uuid>,
    /// The category of the action.
    pub action: AuditAction,
    /// The kind of resource acted upon.
    pub resource: String,
    /// The specific resource identifier, if the route carries one.
    pub resource_id: Option<String>,
    /// Resource state before the operation.
    pub old_values: Option<serde_json::Value>,
    /// Resource state after the operation.
    pub new_values: Option<serde_json::Value>,
    /// Request metadata: method, path, query, user agent.
    pub metadata: Option<serde_json::Value>,
    /// IP address of the caller.
    pub ip_address: Option<String>,
    /// User-Agent header of the caller.
    pub user_agent: Option<String>,
}
