//! Password policy enforcement for new passwords.

use corehr_core::config::auth::AuthConfig;
use corehr_core::error::AppError;

/// The symbols accepted as "special characters" by the strength policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Validates password strength against the configured policy.
///
/// A password must be at least the configured length and contain at least
/// one uppercase letter, one lowercase letter, one digit, and one symbol
/// from [`PASSWORD_SYMBOLS`].
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password against all policy rules.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or an error describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(AppError::validation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(AppError::validation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
            return Err(AppError::validation(
                "Password must contain at least one special character",
            ));
        }

        Ok(())
    }

    /// Whether a password satisfies the policy.
    pub fn is_strong(&self, password: &str) -> bool {
        self.validate(password).is_ok()
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}
