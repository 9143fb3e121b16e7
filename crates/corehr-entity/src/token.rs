//! Server-side token records.
//!
//! Access tokens are stateless and never stored; refresh and password-reset
//! tokens are tracked so they can be rotated and revoked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored refresh token.
///
/// At most one valid record represents a given issuance lineage at a time;
/// rotation atomically replaces it. A record that is absent when presented
/// means the token was never issued or has already been consumed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// The signed token string itself.
    pub token: String,
    /// The owning user.
    pub user_id: Uuid,
    /// Expiry of the stored record (mirrors the embedded claim).
    pub expires_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the stored record has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// A stored password-reset token. At most one active record per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    /// The signed token string itself.
    pub token: String,
    /// The owning user.
    pub user_id: Uuid,
    /// Expiry of the stored record.
    pub expires_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Whether the stored record has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
