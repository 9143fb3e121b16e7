//! Non-blocking audit capture.

pub mod recorder;

pub use recorder::{AuditEvent, AuditRecorder};
