//! TOTP two-factor enrollment and verification.

pub mod service;

pub use service::{TwoFactorEnrollment, TwoFactorService};
