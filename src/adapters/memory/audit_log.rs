//! In-memory audit log for testing.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::ports::{AuditEvent, AuditLog};

/// In-memory audit log for tests and local development.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryAuditLog {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all recorded events (for test assertions).
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .read()
            .expect("InMemoryAuditLog: events lock poisoned")
            .clone()
    }

    /// Returns events with a specific action.
    pub fn events_with_action(&self, action: &str) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, event: &AuditEvent) -> Result<(), DomainError> {
        self.events
            .write()
            .expect("InMemoryAuditLog: events lock poisoned")
            .push(event.clone());
        Ok(())
    }
}
