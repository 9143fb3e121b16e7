//! Password recovery — forgot, reset, and authenticated change.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use corehr_auth::password::{PasswordHasher, PasswordValidator};
use corehr_auth::token::TokenService;
use corehr_core::error::AppError;
use corehr_core::traits::{CredentialStore, Notifier};
use corehr_entity::token::PasswordResetToken;

/// Orchestrates the three password flows against the credential store.
pub struct PasswordRecoveryService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    notifier: Arc<dyn Notifier>,
    frontend_url: String,
}

impl std::fmt::Debug for PasswordRecoveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordRecoveryService")
            .field("frontend_url", &self.frontend_url)
            .finish()
    }
}

impl PasswordRecoveryService {
    /// Creates a new recovery service.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
        validator: PasswordValidator,
        notifier: Arc<dyn Notifier>,
        frontend_url: String,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            validator,
            notifier,
            frontend_url,
        }
    }

    /// Starts password recovery for an email address.
    ///
    /// Succeeds whether or not the account exists or is active, closing
    /// the enumeration side channel. Creating a new reset token
    /// invalidates any prior one for the user. Notifier failures are
    /// logged and swallowed.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) if user.can_login() => user,
            _ => {
                info!("Password reset requested for unknown or inactive account");
                return Ok(());
            }
        };

        let (token, expires_at) = self.tokens.issue_reset_token(user.id)?;
        self.store
            .save_password_reset_token(&PasswordResetToken {
                token: token.clone(),
                user_id: user.id,
                expires_at,
                created_at: Utc::now(),
            })
            .await?;

        let link = format!("{}/reset-password?token={}", self.frontend_url, token);
        if let Err(e) = self
            .notifier
            .send_password_reset(&user.email, &user.name, &link)
            .await
        {
            error!(user_id = %user.id, error = %e, "Failed to send password reset notification");
        }

        info!(user_id = %user.id, "Password reset initiated");
        Ok(())
    }

    /// Completes password recovery with a reset token.
    ///
    /// The token must verify against the reset domain *and* still be
    /// tracked in the store; either failing yields the same uniform
    /// error. The consumed token is removed so it cannot be replayed.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        self.validator.validate(new_password)?;

        self.tokens.verify_reset_token(token).map_err(|e| {
            warn!(error = %e, "Password reset token rejected");
            AppError::validation("Invalid or expired reset token")
        })?;

        let record = self
            .store
            .find_by_password_reset_token(token)
            .await?
            .ok_or_else(|| {
                warn!("Password reset attempted with unknown token");
                AppError::validation("Invalid or expired reset token")
            })?;

        let user = self
            .store
            .find_by_id(record.user_id)
            .await?
            .ok_or_else(|| AppError::validation("Invalid or expired reset token"))?;

        if !user.can_login() {
            warn!(user_id = %user.id, "Password reset attempted for inactive account");
            return Err(AppError::authorization("Account is inactive"));
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.store.update_password(user.id, &password_hash).await?;
        self.store.remove_password_reset_token(user.id).await?;

        info!(user_id = %user.id, "Password reset successful");
        Ok(())
    }

    /// Changes the password of an authenticated user after re-checking
    /// the current one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        self.validator
            .validate_not_same(current_password, new_password)?;
        self.validator.validate(new_password)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !user.can_login() {
            return Err(AppError::authorization("Account is inactive"));
        }

        if !self
            .hasher
            .compare(current_password, &user.password_hash)?
        {
            warn!(user_id = %user_id, "Password change with incorrect current password");
            return Err(AppError::authentication("Current password is incorrect"));
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.store.update_password(user_id, &password_hash).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
