//! # corehr-api
//!
//! HTTP API layer for CoreHR using Axum: application state, request and
//! response DTOs, error mapping, the guard and audit middleware, and the
//! route table.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use state::AppState;
