//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use corehr_auth::guard::{GuardPipeline, GuardStep};
use corehr_auth::password::{PasswordGenerator, PasswordHasher, PasswordValidator};
use corehr_auth::token::TokenService;
use corehr_auth::twofactor::TwoFactorService;
use corehr_core::config::AppConfig;
use corehr_core::error::AppError;
use corehr_core::traits::{AuditStore, CredentialStore, EmployeeDirectory, Notifier};
use corehr_service::audit::AuditRecorder;
use corehr_service::auth::{AuthService, PasswordRecoveryService};
use corehr_service::user::AdminUserService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks. The stores arrive as
/// trait objects, constructed once at process start and injected here —
/// production wires PostgreSQL, tests wire the in-memory substitutes.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,

    /// Durable credential storage.
    pub store: Arc<dyn CredentialStore>,
    /// Append-only audit storage.
    pub audit_store: Arc<dyn AuditStore>,
    /// Employee hierarchy lookups.
    pub directory: Arc<dyn EmployeeDirectory>,

    /// Token issuance and verification.
    pub tokens: Arc<TokenService>,
    /// Password hashing.
    pub password_hasher: Arc<PasswordHasher>,
    /// Two-factor enrollment and verification.
    pub two_factor: Arc<TwoFactorService>,

    /// Session lifecycle use cases.
    pub auth_service: Arc<AuthService>,
    /// Password recovery use cases.
    pub recovery_service: Arc<PasswordRecoveryService>,
    /// Administrative user management.
    pub admin_users: Arc<AdminUserService>,
    /// Non-blocking audit capture.
    pub audit_recorder: AuditRecorder,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish()
    }
}

impl AppState {
    /// Wires the full service graph on top of the injected collaborators.
    ///
    /// Must be called from within a tokio runtime (the audit recorder
    /// spawns its worker here).
    pub fn build(
        config: Arc<AppConfig>,
        store: Arc<dyn CredentialStore>,
        audit_store: Arc<dyn AuditStore>,
        directory: Arc<dyn EmployeeDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let tokens = Arc::new(TokenService::new(&config.auth));
        let password_hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let validator = PasswordValidator::new(&config.auth);
        let generator = PasswordGenerator::new(&config.auth);

        let two_factor = Arc::new(TwoFactorService::new(&config.auth, Arc::clone(&store)));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&tokens),
            Arc::clone(&password_hasher),
            validator.clone(),
            Arc::clone(&two_factor),
        ));

        let recovery_service = Arc::new(PasswordRecoveryService::new(
            Arc::clone(&store),
            Arc::clone(&tokens),
            Arc::clone(&password_hasher),
            validator,
            notifier,
            config.server.frontend_url.clone(),
        ));

        let admin_users = Arc::new(AdminUserService::new(
            Arc::clone(&store),
            Arc::clone(&password_hasher),
            generator,
        ));

        let audit_recorder =
            AuditRecorder::new(Arc::clone(&audit_store), config.audit.queue_capacity);

        Ok(Self {
            config,
            store,
            audit_store,
            directory,
            tokens,
            password_hasher,
            two_factor,
            auth_service,
            recovery_service,
            admin_users,
            audit_recorder,
        })
    }

    /// Builds a guard pipeline over this state's token service and
    /// employee directory.
    pub fn guard_pipeline(&self, steps: Vec<GuardStep>) -> GuardPipeline {
        GuardPipeline::new(Arc::clone(&self.tokens), Arc::clone(&self.directory), steps)
    }
}
