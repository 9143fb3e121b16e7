//! Session and password-recovery use cases.

pub mod recovery;
pub mod service;

pub use recovery::PasswordRecoveryService;
pub use service::{AuthService, LoginOutcome, TokenPair, TwoFactorVerifyOutcome};
