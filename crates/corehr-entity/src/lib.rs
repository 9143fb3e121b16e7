//! # corehr-entity
//!
//! Domain entity models for CoreHR: users and roles, refresh and
//! password-reset token records, and audit log entries.
//!
//! This crate has **no** internal dependencies on other CoreHR crates.

pub mod audit;
pub mod token;
pub mod user;

pub use audit::{AuditAction, AuditLogEntry, NewAuditLogEntry};
pub use token::{PasswordResetToken, RefreshToken};
pub use user::{NewUser, User, UserRole, UserUpdate};
