//! Audit recorder with a bounded background persistence queue.
//!
//! Request handling never waits on audit persistence: entries are pushed
//! onto a bounded channel and written by a dedicated worker task. When
//! the queue is full the entry is dropped with a warning — bounded memory
//! beats blocking the caller. Store failures are logged and never
//! propagate into the request path.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};
use uuid::Uuid;

use corehr_core::traits::AuditStore;
use corehr_entity::audit::{AuditAction, NewAuditLogEntry};

enum AuditMessage {
    Entry(NewAuditLogEntry),
    Flush(oneshot::Sender<()>),
}

/// An audit event captured at a call site, before the action kind is
/// fixed by one of the recorder's wrappers.
#[derive(Debug, Clone, Default)]
pub struct AuditEvent {
    /// The acting user, when authenticated.
    pub user_id: Option<Uuid>,
    /// The kind of resource acted upon.
    pub resource: String,
    /// The specific resource identifier, if known.
    pub resource_id: Option<String>,
    /// Resource state before the operation.
    pub old_values: Option<Value>,
    /// Resource state after the operation.
    pub new_values: Option<Value>,
    /// Request metadata: method, path, query, user agent.
    pub metadata: Option<Value>,
    /// IP address of the caller.
    pub ip_address: Option<String>,
    /// User-Agent header of the caller.
    pub user_agent: Option<String>,
}

impl AuditEvent {
    fn into_entry(self, action: AuditAction) -> NewAuditLogEntry {
        NewAuditLogEntry {
            user_id: self.user_id,
            action,
            resource: self.resource,
            resource_id: self.resource_id,
            old_values: self.old_values,
            new_values: self.new_values,
            metadata: self.metadata,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
        }
    }
}

/// Fire-and-forget audit capture backed by a bounded queue and a single
/// worker task.
#[derive(Clone)]
pub struct AuditRecorder {
    tx: mpsc::Sender<AuditMessage>,
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish()
    }
}

impl AuditRecorder {
    /// Creates a recorder and spawns its persistence worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: Arc<dyn AuditStore>, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel(queue_capacity.max(1));

        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    AuditMessage::Entry(entry) => {
                        if let Err(e) = store.create(&entry).await {
                            error!(
                                error = %e,
                                action = %entry.action,
                                resource = %entry.resource,
                                "Failed to persist audit entry"
                            );
                        }
                    }
                    AuditMessage::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    /// Records an access (read) of a resource.
    pub fn record_access(&self, event: AuditEvent) {
        self.record(event.into_entry(AuditAction::Access));
    }

    /// Records creation of a resource.
    pub fn record_create(&self, event: AuditEvent) {
        self.record(event.into_entry(AuditAction::Create));
    }

    /// Records mutation of a resource.
    pub fn record_update(&self, event: AuditEvent) {
        self.record(event.into_entry(AuditAction::Update));
    }

    /// Records deletion of a resource.
    pub fn record_delete(&self, event: AuditEvent) {
        self.record(event.into_entry(AuditAction::Delete));
    }

    /// Enqueues a prepared entry without blocking.
    pub fn record(&self, entry: NewAuditLogEntry) {
        match self.tx.try_send(AuditMessage::Entry(entry)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(AuditMessage::Entry(entry))) => {
                warn!(
                    action = %entry.action,
                    resource = %entry.resource,
                    "Audit queue full; dropping entry"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Audit worker has stopped; dropping entry");
            }
            Err(_) => {}
        }
    }

    /// Waits until every entry enqueued before this call has been handed
    /// to the store. Used on graceful shutdown and by tests.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(AuditMessage::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }
}
