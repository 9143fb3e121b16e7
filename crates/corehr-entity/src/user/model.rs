//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user account in the CoreHR system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique email address used for login.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Access control role.
    pub role: UserRole,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Whether two-factor authentication is required at login.
    pub two_factor_enabled: bool,
    /// TOTP secret (base32). Present once enrollment has begun.
    #[serde(skip_serializing)]
    pub two_factor_secret: Option<String>,
    /// Linked employee record, if any.
    pub employee_id: Option<Uuid>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account can currently authenticate.
    pub fn can_login(&self) -> bool {
        self.is_active
    }
}

/// Data required to create a new user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// Whether the account starts active.
    pub is_active: bool,
    /// Linked employee record, if any.
    pub employee_id: Option<Uuid>,
}

/// Partial update applied to an existing user account.
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New last-login timestamp.
    pub last_login_at: Option<DateTime<Utc>>,
}
