//! Logging notifier stub.

use async_trait::async_trait;
use tracing::{debug, info};

use corehr_core::result::AppResult;
use corehr_core::traits::Notifier;

/// Notifier that records deliveries in the application log instead of
/// sending email. Stands in until a real delivery collaborator is wired.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a new logging notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_password_reset(&self, to: &str, name: &str, link: &str) -> AppResult<()> {
        info!(to = %to, name = %name, "Password reset notification issued");
        debug!(link = %link, "Password reset link");
        Ok(())
    }
}
