//! Durable store contracts for credentials and the audit trail.

use async_trait::async_trait;
use uuid::Uuid;

use corehr_entity::audit::{AuditAction, AuditLogEntry, NewAuditLogEntry};
use corehr_entity::token::{PasswordResetToken, RefreshToken};
use corehr_entity::user::{NewUser, User, UserUpdate};

use crate::result::AppResult;
use crate::types::pagination::{PageRequest, PageResponse};

/// Durable storage for user accounts and their tracked tokens.
///
/// Implementations must make [`rotate_refresh_token`] atomic: the delete of
/// the old record and the insert of its replacement happen in one
/// transaction, so two concurrent rotations of the same token cannot both
/// succeed. Likewise [`save_password_reset_token`] atomically replaces any
/// prior reset token for the user.
///
/// [`rotate_refresh_token`]: CredentialStore::rotate_refresh_token
/// [`save_password_reset_token`]: CredentialStore::save_password_reset_token
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Create a new user account. Fails with a Conflict error when the
    /// email is already in use.
    async fn create(&self, data: &NewUser) -> AppResult<User>;

    /// Apply a partial update to a user account and return the result.
    async fn update(&self, id: Uuid, data: &UserUpdate) -> AppResult<User>;

    /// List user accounts with pagination, newest first.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>>;

    /// Look up a stored refresh token record by its token string.
    async fn find_by_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>>;

    /// Persist a newly issued refresh token record.
    async fn save_refresh_token(&self, record: &RefreshToken) -> AppResult<()>;

    /// Remove a refresh token record. Removing a token that is already
    /// gone is not an error.
    async fn invalidate_refresh_token(&self, token: &str) -> AppResult<()>;

    /// Remove every refresh token record for a user. Returns the number of
    /// records removed.
    async fn invalidate_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Atomically replace `old_token`'s record with `new_record`.
    ///
    /// Fails with a NotFound error when `old_token` has no record — the
    /// caller treats that as refresh-token reuse.
    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        new_record: &RefreshToken,
    ) -> AppResult<()>;

    /// Persist a password-reset token, atomically invalidating any prior
    /// reset token held by the same user.
    async fn save_password_reset_token(&self, record: &PasswordResetToken) -> AppResult<()>;

    /// Look up a stored, unexpired password-reset token by its token string.
    async fn find_by_password_reset_token(
        &self,
        token: &str,
    ) -> AppResult<Option<PasswordResetToken>>;

    /// Remove any password-reset tokens held by a user.
    async fn remove_password_reset_token(&self, user_id: Uuid) -> AppResult<()>;

    /// Replace a user's password hash.
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Store a TOTP secret on a user record without enabling 2FA.
    async fn save_two_factor_secret(&self, user_id: Uuid, secret: &str) -> AppResult<()>;

    /// Mark two-factor enrollment as complete for a user.
    async fn enable_two_factor(&self, user_id: Uuid) -> AppResult<()>;
}

/// Filter criteria for audit log searches.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Restrict to entries created by this user.
    pub user_id: Option<Uuid>,
    /// Restrict to this action category.
    pub action: Option<AuditAction>,
    /// Restrict to this resource kind.
    pub resource: Option<String>,
}

/// Append-only storage for the audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync + 'static {
    /// Append an audit entry and return the stored row.
    async fn create(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Search entries, newest first.
    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}
