//! # corehr-core
//!
//! Core crate for CoreHR. Contains collaborator traits, configuration
//! schemas, pagination types, and the unified error system.
//!
//! Depends only on `corehr-entity` for the domain models referenced by the
//! trait contracts.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
