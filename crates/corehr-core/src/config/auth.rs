//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
///
/// Each token domain signs with its own secret so that a token minted for
/// one purpose can never be presented as another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access token signing (HMAC-SHA256).
    #[serde(default = "default_access_secret")]
    pub access_token_secret: String,
    /// Secret key for refresh token signing.
    #[serde(default = "default_refresh_secret")]
    pub refresh_token_secret: String,
    /// Secret key for password-reset token signing.
    #[serde(default = "default_reset_secret")]
    pub password_reset_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Password-reset token TTL in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_minutes: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 parallelism degree.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
    /// Issuer name embedded in TOTP enrollment URIs.
    #[serde(default = "default_totp_issuer")]
    pub totp_issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: default_access_secret(),
            refresh_token_secret: default_refresh_secret(),
            password_reset_secret: default_reset_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            reset_ttl_minutes: default_reset_ttl(),
            password_min_length: default_password_min(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            totp_issuer: default_totp_issuer(),
        }
    }
}

fn default_access_secret() -> String {
    "CHANGE_ME_ACCESS_SECRET".to_string()
}

fn default_refresh_secret() -> String {
    "CHANGE_ME_REFRESH_SECRET".to_string()
}

fn default_reset_secret() -> String {
    "CHANGE_ME_RESET_SECRET".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_reset_ttl() -> u64 {
    60
}

fn default_password_min() -> usize {
    8
}

fn default_argon2_memory() -> u32 {
    19456
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

fn default_totp_issuer() -> String {
    "CoreHR".to_string()
}
