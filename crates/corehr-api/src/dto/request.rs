//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use corehr_entity::audit::AuditAction;
use corehr_entity::user::UserRole;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    /// The refresh token being exchanged.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    /// The refresh token to invalidate.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Two-factor verification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TwoFactorVerifyRequest {
    /// The user completing verification.
    pub user_id: Uuid,
    /// The presented TOTP code.
    #[validate(length(min = 1, message = "Code is required"))]
    pub token: String,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Email address of the account.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Reset-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// The reset token from the emailed link.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    /// The new password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Change-password request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// The current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// The new password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Role change request body (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    /// The new role.
    pub role: UserRole,
}

/// Status change request body (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    /// The new active flag.
    pub is_active: bool,
}

/// Pagination query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Items per page.
    pub page_size: Option<u64>,
}

/// Audit search query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Restrict to entries created by this user.
    pub user_id: Option<Uuid>,
    /// Restrict to this action category.
    pub action: Option<AuditAction>,
    /// Restrict to this resource kind.
    pub resource: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
    /// Items per page.
    pub page_size: Option<u64>,
}
