//! Session lifecycle — login, two-factor verification, refresh rotation,
//! logout, and registration.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use tracing::{info, warn};

use corehr_auth::password::{PasswordHasher, PasswordValidator};
use corehr_auth::token::TokenService;
use corehr_auth::twofactor::TwoFactorService;
use corehr_core::error::AppError;
use corehr_core::traits::CredentialStore;
use corehr_entity::token::RefreshToken;
use corehr_entity::user::{NewUser, User, UserRole, UserUpdate};

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived, single-use refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: chrono::DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: chrono::DateTime<Utc>,
}

/// Result of a successful password check at login.
///
/// When the account has two-factor enabled, `tokens` is `None`: no
/// credentials are issued until the second factor has been verified.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated user.
    pub user: User,
    /// Issued tokens, absent while a second factor is pending.
    pub tokens: Option<TokenPair>,
    /// Whether the client must complete two-factor verification.
    pub requires_two_factor: bool,
}

/// Result of a two-factor verification attempt.
#[derive(Debug, Clone)]
pub struct TwoFactorVerifyOutcome {
    /// Whether the presented code matched.
    pub verified: bool,
    /// Session tokens, present only when verification succeeded.
    pub tokens: Option<TokenPair>,
}

/// Orchestrates the session lifecycle against the credential store.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    validator: PasswordValidator,
    two_factor: Arc<TwoFactorService>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish()
    }
}

impl AuthService {
    /// Creates a new auth service with all required collaborators.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
        validator: PasswordValidator,
        two_factor: Arc<TwoFactorService>,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            validator,
            two_factor,
        }
    }

    /// Authenticates an email/password pair.
    ///
    /// Unknown email and wrong password fail with the same error kind and
    /// message so responses carry no account-existence oracle. Accounts
    /// with two-factor enabled get no tokens here; the session is issued
    /// by [`verify_two_factor`](Self::verify_two_factor).
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                info!("Login attempt for unknown email");
                return Err(AppError::authentication("Invalid credentials"));
            }
        };

        if !user.can_login() {
            info!(user_id = %user.id, "Login attempt on inactive account");
            return Err(AppError::authentication(
                "Account is inactive. Contact an administrator",
            ));
        }

        if !self.hasher.compare(password, &user.password_hash)? {
            info!(user_id = %user.id, "Login attempt with invalid password");
            return Err(AppError::authentication("Invalid credentials"));
        }

        if user.two_factor_enabled {
            info!(user_id = %user.id, "Login pending second factor");
            return Ok(LoginOutcome {
                user,
                tokens: None,
                requires_two_factor: true,
            });
        }

        let tokens = self.issue_session(&user).await?;
        self.touch_last_login(user.id).await;

        info!(user_id = %user.id, "Login successful");
        Ok(LoginOutcome {
            user,
            tokens: Some(tokens),
            requires_two_factor: false,
        })
    }

    /// Verifies a TOTP code and, on success, issues the session withheld
    /// at login.
    pub async fn verify_two_factor(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<TwoFactorVerifyOutcome, AppError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !user.can_login() {
            return Err(AppError::authentication(
                "Account is inactive. Contact an administrator",
            ));
        }

        if !self.two_factor.verify(user_id, code).await? {
            return Ok(TwoFactorVerifyOutcome {
                verified: false,
                tokens: None,
            });
        }

        let tokens = self.issue_session(&user).await?;
        self.touch_last_login(user.id).await;

        info!(user_id = %user.id, "Two-factor verification successful");
        Ok(TwoFactorVerifyOutcome {
            verified: true,
            tokens: Some(tokens),
        })
    }

    /// Exchanges a refresh token for a fresh access/refresh pair.
    ///
    /// Rotation is single-use: the presented token's record is atomically
    /// replaced, and presenting a token with no record — never issued or
    /// already consumed — is treated as reuse. On reuse, every stored
    /// refresh token for the user is revoked, ending all of their
    /// sessions.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.tokens.verify_refresh_token(refresh_token).map_err(|e| {
            warn!(error = %e, "Refresh token rejected");
            AppError::authentication("Invalid or expired refresh token")
        })?;

        let record = match self.store.find_by_refresh_token(refresh_token).await? {
            Some(record) => record,
            None => return Err(self.handle_refresh_reuse(claims.sub).await),
        };

        if record.is_expired() {
            self.store.invalidate_refresh_token(refresh_token).await?;
            return Err(AppError::authentication("Invalid or expired refresh token"));
        }

        let user = self
            .store
            .find_by_id(record.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid or expired refresh token"))?;

        if !user.can_login() {
            warn!(user_id = %user.id, "Refresh attempt on inactive account");
            return Err(AppError::authentication(
                "Account is inactive. Contact an administrator",
            ));
        }

        let issued = self.tokens.issue_refresh_token(user.id)?;
        let new_record = RefreshToken {
            token: issued.token.clone(),
            user_id: user.id,
            expires_at: issued.expires_at,
            created_at: Utc::now(),
        };

        match self
            .store
            .rotate_refresh_token(refresh_token, &new_record)
            .await
        {
            Ok(()) => {}
            Err(e) if e.kind == corehr_core::error::ErrorKind::NotFound => {
                // Lost the race to a concurrent rotation of the same token.
                return Err(self.handle_refresh_reuse(claims.sub).await);
            }
            Err(e) => return Err(e),
        }

        let (access_token, access_expires_at) = self.tokens.issue_access_token(&user)?;

        info!(user_id = %user.id, "Refresh token rotated");
        Ok(TokenPair {
            access_token,
            refresh_token: issued.token,
            access_expires_at,
            refresh_expires_at: issued.expires_at,
        })
    }

    /// Ends the session holding the given refresh token. Unknown tokens
    /// are ignored so logout is idempotent.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        self.store.invalidate_refresh_token(refresh_token).await?;
        info!("Logout completed");
        Ok(())
    }

    /// Registers a new account with the default EMPLOYEE role and issues
    /// its first session.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, TokenPair), AppError> {
        if !is_valid_email(email) {
            return Err(AppError::validation("Invalid email format"));
        }
        self.validator.validate(password)?;

        if self.store.find_by_email(email).await?.is_some() {
            warn!("Registration attempt with existing email");
            return Err(AppError::conflict("This email is already in use"));
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .store
            .create(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role: UserRole::Employee,
                is_active: true,
                employee_id: None,
            })
            .await?;

        let tokens = self.issue_session(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok((user, tokens))
    }

    /// Issues an access/refresh pair and persists the refresh record.
    async fn issue_session(&self, user: &User) -> Result<TokenPair, AppError> {
        let (access_token, access_expires_at) = self.tokens.issue_access_token(user)?;
        let issued = self.tokens.issue_refresh_token(user.id)?;

        self.store
            .save_refresh_token(&RefreshToken {
                token: issued.token.clone(),
                user_id: user.id,
                expires_at: issued.expires_at,
                created_at: Utc::now(),
            })
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token: issued.token,
            access_expires_at,
            refresh_expires_at: issued.expires_at,
        })
    }

    /// Revokes all of a user's refresh tokens after detected reuse and
    /// returns the uniform authentication error.
    async fn handle_refresh_reuse(&self, user_id: Uuid) -> AppError {
        warn!(user_id = %user_id, "Refresh token reuse detected; revoking all sessions");

        match self.store.invalidate_refresh_tokens_for_user(user_id).await {
            Ok(revoked) if revoked > 0 => {
                warn!(user_id = %user_id, revoked, "Outstanding refresh tokens revoked");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to revoke refresh tokens");
            }
        }

        AppError::authentication("Invalid or expired refresh token")
    }

    /// Best-effort last-login stamp; failures are logged, never surfaced.
    async fn touch_last_login(&self, user_id: Uuid) {
        let update = UserUpdate {
            last_login_at: Some(Utc::now()),
            ..UserUpdate::default()
        };
        if let Err(e) = self.store.update(user_id, &update).await {
            warn!(user_id = %user_id, error = %e, "Failed to update last login");
        }
    }
}

/// Minimal email shape check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape_check() {
        assert!(is_valid_email("user@corehr.dev"));
        assert!(!is_valid_email("user@corehr"));
        assert!(!is_valid_email("@corehr.dev"));
        assert!(!is_valid_email("user corehr@x.dev"));
        assert!(!is_valid_email("user@.dev"));
    }
}
