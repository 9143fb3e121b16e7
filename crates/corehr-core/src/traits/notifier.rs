//! Outbound notification contract.

use async_trait::async_trait;

use crate::result::AppResult;

/// Delivers user-facing notifications. Email transport is an external
/// collaborator; the identity subsystem only depends on this contract.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Send a password-reset message containing `link` to `to`.
    async fn send_password_reset(&self, to: &str, name: &str, link: &str) -> AppResult<()>;
}
