//! Audit trail configuration.

use serde::{Deserialize, Serialize};

/// Audit recorder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Capacity of the in-process audit queue. When the queue is full,
    /// new entries are dropped and a warning is logged.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}
