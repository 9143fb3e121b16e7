//! # corehr-auth
//!
//! Authentication and authorization primitives for the CoreHR platform.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing, strength policy, random generation
//! - `token` — issuance and verification for the three signed-token domains
//! - `twofactor` — TOTP enrollment and verification
//! - `guard` — the ordered authentication/authorization pipeline

pub mod guard;
pub mod password;
pub mod token;
pub mod twofactor;

pub use guard::{GuardPipeline, GuardRequest, GuardStep, RequestContext};
pub use password::{PasswordGenerator, PasswordHasher, PasswordValidator};
pub use token::{AccessClaims, RefreshClaims, ResetClaims, TokenError, TokenService};
pub use twofactor::{TwoFactorEnrollment, TwoFactorService};
