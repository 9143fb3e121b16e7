//! TOTP secret enrollment and code verification.

use std::sync::Arc;

use totp_rs::{Algorithm, Secret, TOTP};
use tracing::{info, warn};
use uuid::Uuid;

use corehr_core::config::auth::AuthConfig;
use corehr_core::error::AppError;
use corehr_core::traits::CredentialStore;

/// TOTP digits per code.
const TOTP_DIGITS: usize = 6;
/// Accepted clock skew in time steps on each side of "now".
const TOTP_SKEW: u8 = 1;
/// Time step size in seconds.
const TOTP_STEP: u64 = 30;

/// Result of starting two-factor enrollment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TwoFactorEnrollment {
    /// The base32-encoded shared secret.
    pub secret: String,
    /// The otpauth:// URI an authenticator app can import.
    pub otpauth_url: String,
    /// PNG QR code of the URI, base64-encoded.
    pub qr_code: String,
}

/// Manages TOTP enrollment and login-time verification.
pub struct TwoFactorService {
    issuer: String,
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for TwoFactorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoFactorService")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TwoFactorService {
    /// Creates a new two-factor service.
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            issuer: config.totp_issuer.clone(),
            store,
        }
    }

    /// Begins enrollment for a user.
    ///
    /// Generates a fresh random secret, stores it on the user record
    /// *without* enabling two-factor (enrollment completes on the first
    /// successful [`verify`](Self::verify)), and returns the material the
    /// client renders as a QR code.
    pub async fn setup(&self, user_id: Uuid) -> Result<TwoFactorEnrollment, AppError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let secret = Secret::generate_secret();
        let encoded = secret.to_encoded().to_string();

        let totp = self.build_totp(&encoded, &user.email)?;
        let otpauth_url = totp.get_url();
        let qr_code = totp
            .get_qr_base64()
            .map_err(|e| AppError::internal(format!("Failed to render QR code: {e}")))?;

        self.store.save_two_factor_secret(user_id, &encoded).await?;

        info!(user_id = %user_id, "Two-factor enrollment initiated");

        Ok(TwoFactorEnrollment {
            secret: encoded,
            otpauth_url,
            qr_code,
        })
    }

    /// Verifies a presented code against the user's stored secret.
    ///
    /// Accepts the current time step and one step on each side. A code
    /// outside the window returns `Ok(false)` rather than an error so
    /// callers can present a uniform "invalid code" message. On the first
    /// successful verification, two-factor is enabled on the account.
    pub async fn verify(&self, user_id: Uuid, code: &str) -> Result<bool, AppError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let secret = user.two_factor_secret.as_deref().ok_or_else(|| {
            warn!(user_id = %user_id, "Two-factor verification without enrollment");
            AppError::validation("Two-factor authentication has not been configured")
        })?;

        let totp = self.build_totp(secret, &user.email)?;
        let matched = totp
            .check_current(code)
            .map_err(|e| AppError::internal(format!("System clock error: {e}")))?;

        if !matched {
            warn!(user_id = %user_id, "Invalid two-factor code");
            return Ok(false);
        }

        if !user.two_factor_enabled {
            self.store.enable_two_factor(user_id).await?;
            info!(user_id = %user_id, "Two-factor enrollment completed");
        }

        Ok(true)
    }

    fn build_totp(&self, base32_secret: &str, account: &str) -> Result<TOTP, AppError> {
        let secret_bytes = Secret::Encoded(base32_secret.to_string())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Stored TOTP secret is invalid: {e:?}")))?;

        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            secret_bytes,
            Some(self.issuer.clone()),
            account.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to build TOTP: {e:?}")))
    }
}
