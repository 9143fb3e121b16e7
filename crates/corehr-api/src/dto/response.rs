//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use corehr_entity::user::User;
use corehr_service::auth::{LoginOutcome, TokenPair, TwoFactorVerifyOutcome};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// User summary for responses. Never carries the password hash or the
/// TOTP secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether two-factor authentication is enabled.
    pub two_factor_enabled: bool,
    /// Linked employee record, if any.
    pub employee_id: Option<Uuid>,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            is_active: user.is_active,
            two_factor_enabled: user.two_factor_enabled,
            employee_id: user.employee_id,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Login response. Token fields are absent while a second factor is
/// pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// User info.
    pub user: UserResponse,
    /// Access token, when issued.
    pub access_token: Option<String>,
    /// Refresh token, when issued.
    pub refresh_token: Option<String>,
    /// Access token expiration, when issued.
    pub access_expires_at: Option<DateTime<Utc>>,
    /// Refresh token expiration, when issued.
    pub refresh_expires_at: Option<DateTime<Utc>>,
    /// Whether the client must complete two-factor verification.
    pub requires_two_factor: bool,
}

impl From<&LoginOutcome> for LoginResponse {
    fn from(outcome: &LoginOutcome) -> Self {
        Self {
            user: UserResponse::from(&outcome.user),
            access_token: outcome.tokens.as_ref().map(|t| t.access_token.clone()),
            refresh_token: outcome.tokens.as_ref().map(|t| t.refresh_token.clone()),
            access_expires_at: outcome.tokens.as_ref().map(|t| t.access_expires_at),
            refresh_expires_at: outcome.tokens.as_ref().map(|t| t.refresh_expires_at),
            requires_two_factor: outcome.requires_two_factor,
        }
    }
}

/// Token pair response for refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

impl From<&TokenPair> for TokenResponse {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            access_expires_at: pair.access_expires_at,
            refresh_expires_at: pair.refresh_expires_at,
        }
    }
}

/// Two-factor enrollment response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorSetupResponse {
    /// Base32 shared secret.
    pub secret: String,
    /// otpauth:// URI for authenticator apps.
    pub otpauth_url: String,
    /// Base64 PNG QR code of the URI.
    pub qr_code: String,
}

/// Two-factor verification response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorVerifyResponse {
    /// Whether the presented code matched.
    pub verified: bool,
    /// Access token, on success.
    pub access_token: Option<String>,
    /// Refresh token, on success.
    pub refresh_token: Option<String>,
}

impl From<&TwoFactorVerifyOutcome> for TwoFactorVerifyResponse {
    fn from(outcome: &TwoFactorVerifyOutcome) -> Self {
        Self {
            verified: outcome.verified,
            access_token: outcome.tokens.as_ref().map(|t| t.access_token.clone()),
            refresh_token: outcome.tokens.as_ref().map(|t| t.refresh_token.clone()),
        }
    }
}

/// Generated-password response for administrative resets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPasswordResponse {
    /// The newly generated password, for out-of-band delivery.
    pub password: String,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
