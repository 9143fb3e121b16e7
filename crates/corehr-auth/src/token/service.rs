//! Token creation and verification with per-domain signing secrets.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use corehr_core::config::auth::AuthConfig;
use corehr_core::error::AppError;
use corehr_entity::user::User;

use super::claims::{AccessClaims, RefreshClaims, ResetClaims, TokenError};

/// Signing and verification keys for one token domain.
struct DomainKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl DomainKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// A freshly issued refresh token together with the data the store needs
/// to track it.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    /// The signed token string.
    pub token: String,
    /// The random nonce embedded in the token.
    pub jti: Uuid,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Creates and verifies tokens for the access, refresh, and password-reset
/// domains. Verification is CPU-only; no storage lookup happens here.
pub struct TokenService {
    access: DomainKeys,
    refresh: DomainKeys,
    reset: DomainKeys,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
    reset_ttl_minutes: i64,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("reset_ttl_minutes", &self.reset_ttl_minutes)
            .finish()
    }
}

impl TokenService {
    /// Creates a token service from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            access: DomainKeys::from_secret(&config.access_token_secret),
            refresh: DomainKeys::from_secret(&config.refresh_token_secret),
            reset: DomainKeys::from_secret(&config.password_reset_secret),
            access_ttl_minutes: config.access_ttl_minutes as i64,
            refresh_ttl_days: config.refresh_ttl_days as i64,
            reset_ttl_minutes: config.reset_ttl_minutes as i64,
            validation,
        }
    }

    /// Issues an access token carrying the user's identity claims.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_ttl_minutes);

        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            employee_id: user.employee_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = self.sign(&self.access, &claims, "access")?;
        Ok((token, exp))
    }

    /// Issues a refresh token for the given user.
    ///
    /// Uniqueness comes from a random `jti` nonce, so two tokens issued in
    /// the same instant are still distinct.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedRefreshToken, AppError> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_ttl_days);
        let jti = Uuid::new_v4();

        let claims = RefreshClaims {
            sub: user_id,
            jti,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = self.sign(&self.refresh, &claims, "refresh")?;
        Ok(IssuedRefreshToken {
            token,
            jti,
            expires_at: exp,
        })
    }

    /// Issues a password-reset token for the given user.
    pub fn issue_reset_token(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.reset_ttl_minutes);

        let claims = ResetClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = self.sign(&self.reset, &claims, "password-reset")?;
        Ok((token, exp))
    }

    /// Verifies an access token's signature and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.check(&self.access, token)
    }

    /// Verifies a refresh token's signature and expiry.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.check(&self.refresh, token)
    }

    /// Verifies a password-reset token's signature and expiry.
    pub fn verify_reset_token(&self, token: &str) -> Result<ResetClaims, TokenError> {
        self.check(&self.reset, token)
    }

    fn sign<C: Serialize>(
        &self,
        keys: &DomainKeys,
        claims: &C,
        domain: &str,
    ) -> Result<String, AppError> {
        encode(&Header::default(), claims, &keys.encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode {domain} token: {e}")))
    }

    fn check<C: DeserializeOwned>(&self, keys: &DomainKeys, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })
    }
}
