//! In-memory processed event store for testing.
//!
//! Mirrors the first-save-wins semantics of the PostgreSQL store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::{ProcessedEvent, ProcessedEventStore, SaveResult};

/// In-memory processed event store for tests and local development.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryProcessedEventStore {
    records: RwLock<HashMap<String, ProcessedEvent>>,
}

impl InMemoryProcessedEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all stored records (for test assertions).
    pub fn records(&self) -> Vec<ProcessedEvent> {
        self.records
            .read()
            .expect("InMemoryProcessedEventStore: records lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl Default for InMemoryProcessedEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEventStore {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<ProcessedEvent>, DomainError> {
        Ok(self
            .records
            .read()
            .expect("InMemoryProcessedEventStore: records lock poisoned")
            .get(event_id)
            .cloned())
    }

    async fn save(&self, record: ProcessedEvent) -> Result<SaveResult, DomainError> {
        let mut records = self
            .records
            .write()
            .expect("InMemoryProcessedEventStore: records lock poisoned");

        if records.contains_key(&record.event_id) {
            return Ok(SaveResult::AlreadyExists);
        }

        records.insert(record.event_id.clone(), record);
        Ok(SaveResult::Inserted)
    }

    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let mut records = self
            .records
            .write()
            .expect("InMemoryProcessedEventStore: records lock poisoned");

        let before = records.len();
        records.retain(|_, record| record.processed_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}
