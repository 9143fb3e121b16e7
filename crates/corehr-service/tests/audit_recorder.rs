//! Tests for the bounded, fire-and-forget audit recorder.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use corehr_core::error::AppError;
use corehr_core::result::AppResult;
use corehr_core::traits::store::{AuditFilter, AuditStore};
use corehr_core::types::pagination::{PageRequest, PageResponse};
use corehr_database::MemoryAuditStore;
use corehr_entity::audit::{AuditAction, AuditLogEntry, NewAuditLogEntry};
use corehr_service::audit::{AuditEvent, AuditRecorder};

fn event(resource: &str) -> AuditEvent {
    AuditEvent {
        resource: resource.to_string(),
        ..AuditEvent::default()
    }
}

#[tokio::test]
async fn test_entries_are_persisted_with_fixed_actions() {
    let store = Arc::new(MemoryAuditStore::new());
    let recorder = AuditRecorder::new(store.clone(), 16);

    recorder.record_access(event("user"));
    recorder.record_create(event("user"));
    recorder.record_update(event("user"));
    recorder.record_delete(event("user"));
    recorder.flush().await;

    let actions: Vec<AuditAction> = store.entries().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Access,
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
        ]
    );
}

/// Store that always fails. Used to prove persistence failures stay
/// inside the recorder.
struct FailingStore;

#[async_trait]
impl AuditStore for FailingStore {
    async fn create(&self, _entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        Err(AppError::database("audit storage is down"))
    }

    async fn search(
        &self,
        _filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        Ok(PageResponse::new(vec![], page.page, page.page_size, 0))
    }
}

#[tokio::test]
async fn test_store_failure_never_reaches_the_caller() {
    let recorder = AuditRecorder::new(Arc::new(FailingStore), 16);

    // Both the enqueue and the flush complete despite every write failing.
    recorder.record_create(event("user"));
    recorder.record_update(event("user"));
    recorder.flush().await;
}

/// Store whose writes park until released, so the queue can be filled
/// deterministically.
struct GatedStore {
    started: Mutex<usize>,
    gate: Semaphore,
    entries: Mutex<Vec<NewAuditLogEntry>>,
}

impl GatedStore {
    fn new() -> Self {
        Self {
            started: Mutex::new(0),
            gate: Semaphore::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }

    fn started(&self) -> usize {
        *self.started.lock().unwrap()
    }

    fn stored(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl AuditStore for GatedStore {
    async fn create(&self, entry: &NewAuditLogEntry) -> AppResult<AuditLogEntry> {
        *self.started.lock().unwrap() += 1;
        let _permit = self.gate.acquire().await.expect("gate closed");
        self.entries.lock().unwrap().push(entry.clone());

        Ok(AuditLogEntry {
            id: uuid::Uuid::new_v4(),
            user_id: entry.user_id,
            action: entry.action,
            resource: entry.resource.clone(),
            resource_id: entry.resource_id.clone(),
            old_values: None,
            new_values: None,
            metadata: None,
            ip_address: None,
            user_agent: None,
            created_at: chrono::Utc::now(),
        })
    }

    async fn search(
        &self,
        _filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        Ok(PageResponse::new(vec![], page.page, page.page_size, 0))
    }
}

#[tokio::test]
async fn test_full_queue_drops_instead_of_blocking() {
    let store = Arc::new(GatedStore::new());
    let recorder = AuditRecorder::new(store.clone(), 1);

    // First entry: wait until the worker is parked inside the store.
    recorder.record_create(event("first"));
    while store.started() == 0 {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    // Second fills the queue; third has nowhere to go and is dropped.
    // Neither call blocks.
    recorder.record_create(event("second"));
    recorder.record_create(event("third"));

    store.gate.add_permits(8);
    recorder.flush().await;

    assert_eq!(store.stored(), 2);
}
