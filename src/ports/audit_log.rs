//! Audit log port.
//!
//! Append-only record of privileged and money-adjacent actions: batch code
//! generation, charge disputes, inventory adjustments. Audit writes are
//! best-effort; a failed audit insert is logged but never fails the
//! operation it describes.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::{AuditEventId, DomainError, Timestamp};

/// One audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Unique identifier for this entry.
    pub id: AuditEventId,

    /// Who performed the action, when known (e.g. an email address).
    /// `None` for system-originated events such as webhooks.
    pub actor: Option<String>,

    /// What happened, e.g. "generate_credit_codes".
    pub action: String,

    /// Kind of resource acted on, e.g. "credit_codes".
    pub resource_type: String,

    /// Action-specific payload.
    pub detail: Value,

    /// When the entry was recorded.
    pub created_at: Timestamp,
}

impl AuditEvent {
    /// Creates a new entry with an empty detail payload.
    pub fn new(action: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: AuditEventId::new(),
            actor: None,
            action: action.into(),
            resource_type: resource_type.into(),
            detail: Value::Null,
            created_at: Timestamp::now(),
        }
    }

    /// Sets the acting identity.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Sets the action-specific payload.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Port for appending audit entries.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one entry.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn record(&self, event: &AuditEvent) -> Result<(), DomainError>;
}
