//! Claim payloads for the three token domains.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use corehr_entity::user::UserRole;

/// Why a presented token was rejected.
///
/// These kinds exist for logging and tests; the HTTP boundary collapses
/// all of them into one generic 401 so callers cannot distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token could not be parsed or decoded.
    #[error("token is malformed")]
    Malformed,
    /// The token's embedded expiry has passed.
    #[error("token has expired")]
    Expired,
    /// The signature does not match the domain secret.
    #[error("token signature is invalid")]
    SignatureInvalid,
}

/// Claims embedded in an access token.
///
/// Access tokens are stateless: verification is a pure signature and
/// expiry check with no storage lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Email address at the time of issuance.
    pub email: String,
    /// Role at the time of issuance.
    pub role: UserRole,
    /// Linked employee record, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Uuid>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims embedded in a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Random nonce making every issuance unique.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims embedded in a password-reset token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Subject — the user ID.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}
