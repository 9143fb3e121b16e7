//! Administrative user operations: listing, role and status changes,
//! and forced password resets.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use corehr_auth::password::{PasswordGenerator, PasswordHasher};
use corehr_core::error::AppError;
use corehr_core::traits::CredentialStore;
use corehr_core::types::pagination::{PageRequest, PageResponse};
use corehr_entity::user::{User, UserRole, UserUpdate};

/// User administration for ADMIN/HR callers. Authorization happens in the
/// guard pipeline before these methods run.
pub struct AdminUserService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    generator: PasswordGenerator,
}

impl std::fmt::Debug for AdminUserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUserService").finish()
    }
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<PasswordHasher>,
        generator: PasswordGenerator,
    ) -> Self {
        Self {
            store,
            hasher,
            generator,
        }
    }

    /// Lists user accounts, newest first.
    pub async fn list_users(&self, page: PageRequest) -> Result<PageResponse<User>, AppError> {
        self.store.list(&page).await
    }

    /// Fetches a user by ID.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Changes a user's role.
    pub async fn change_role(&self, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        let user = self
            .store
            .update(
                user_id,
                &UserUpdate {
                    role: Some(role),
                    ..UserUpdate::default()
                },
            )
            .await?;

        info!(user_id = %user_id, role = %role, "User role changed");
        Ok(user)
    }

    /// Activates or deactivates a user account. Deactivation also revokes
    /// every outstanding refresh token so existing sessions cannot be
    /// extended.
    pub async fn change_status(&self, user_id: Uuid, is_active: bool) -> Result<User, AppError> {
        let user = self
            .store
            .update(
                user_id,
                &UserUpdate {
                    is_active: Some(is_active),
                    ..UserUpdate::default()
                },
            )
            .await?;

        if !is_active {
            let revoked = self.store.invalidate_refresh_tokens_for_user(user_id).await?;
            if revoked > 0 {
                warn!(user_id = %user_id, revoked, "Sessions revoked on deactivation");
            }
        }

        info!(user_id = %user_id, is_active, "User status changed");
        Ok(user)
    }

    /// Resets a user's password to a freshly generated one and revokes
    /// their sessions. Returns the generated password for out-of-band
    /// delivery.
    pub async fn reset_password(&self, user_id: Uuid) -> Result<String, AppError> {
        // Ensure the user exists before generating anything.
        self.get_user(user_id).await?;

        let password = self.generator.generate()?;
        let password_hash = self.hasher.hash(&password)?;

        self.store.update_password(user_id, &password_hash).await?;
        self.store.invalidate_refresh_tokens_for_user(user_id).await?;

        info!(user_id = %user_id, "Password reset by administrator");
        Ok(password)
    }
}
