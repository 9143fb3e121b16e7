//! # corehr-service
//!
//! Use-case orchestration for the CoreHR identity subsystem: login and
//! session lifecycle, password recovery, audit recording, and
//! administrative user management. Services receive their collaborators
//! by constructor injection and hold no global state.

pub mod audit;
pub mod auth;
pub mod notify;
pub mod user;

pub use audit::{AuditEvent, AuditRecorder};
pub use auth::recovery::PasswordRecoveryService;
pub use auth::service::{AuthService, LoginOutcome, TokenPair, TwoFactorVerifyOutcome};
pub use notify::LogNotifier;
pub use user::admin::AdminUserService;
