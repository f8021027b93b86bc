//! Processed event store port.
//!
//! Tracks which gateway webhook events have already been handled. The
//! gateway may deliver the same event several times (timeouts, 5xx
//! responses, retries after a lost ack), so the webhook pipeline treats
//! every delivery as possibly duplicated.
//!
//! First delivery to save its record wins; the store's primary key on the
//! event ID settles concurrent deliveries. The full payload is kept for
//! debugging replayed or failed events.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// How processing of one event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// Handled and all effects applied.
    Success,
    /// Acknowledged but deliberately not acted on.
    Ignored,
    /// Handling was attempted and failed.
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Success => "success",
            ProcessingStatus::Ignored => "ignored",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(ProcessingStatus::Success),
            "ignored" => Some(ProcessingStatus::Ignored),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }
}

/// Record of one processed webhook event.
#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    /// Gateway event ID (`evt_...`).
    pub event_id: String,

    /// Gateway event type, e.g. "payment_intent.succeeded".
    pub event_type: String,

    /// When the event was processed.
    pub processed_at: Timestamp,

    /// How processing ended.
    pub status: ProcessingStatus,

    /// Why the event was ignored, or how it failed.
    pub note: Option<String>,

    /// Original event payload for debugging.
    pub payload: serde_json::Value,
}

impl ProcessedEvent {
    /// Creates a success record.
    pub fn success(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Timestamp::now(),
            status: ProcessingStatus::Success,
            note: None,
            payload,
        }
    }

    /// Creates an ignored record with the reason.
    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Timestamp::now(),
            status: ProcessingStatus::Ignored,
            note: Some(reason.into()),
            payload,
        }
    }

    /// Creates a failure record with the error.
    pub fn failed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        error: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Timestamp::now(),
            status: ProcessingStatus::Failed,
            note: Some(error.into()),
            payload,
        }
    }
}

/// Result of attempting to save a processed event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// Record already exists (duplicate delivery).
    AlreadyExists,
}

/// Port for storing and retrieving processed webhook events.
///
/// Implementations should use a primary key on `event_id` so concurrent
/// deliveries of the same event cannot both insert.
#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    /// Find a previously processed event by its gateway event ID.
    ///
    /// Returns `None` if the event has not been processed.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<ProcessedEvent>, DomainError>;

    /// Attempt to save a processed event record.
    ///
    /// Uses insert-if-absent semantics: returns `Inserted` for the first
    /// save of this event ID and `AlreadyExists` for any later one.
    async fn save(&self, record: ProcessedEvent) -> Result<SaveResult, DomainError>;

    /// Delete records processed before the given time.
    ///
    /// Returns the number of records deleted. Used for retention cleanup.
    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_record_has_no_note() {
        let record = ProcessedEvent::success(
            "evt_123",
            "payment_intent.succeeded",
            serde_json::json!({"id": "evt_123"}),
        );

        assert_eq!(record.event_id, "evt_123");
        assert_eq!(record.status, ProcessingStatus::Success);
        assert!(record.note.is_none());
    }

    #[test]
    fn ignored_record_includes_reason() {
        let record = ProcessedEvent::ignored(
            "evt_456",
            "payment_intent.succeeded",
            "no transaction for this intent",
            serde_json::json!({}),
        );

        assert_eq!(record.status, ProcessingStatus::Ignored);
        assert_eq!(record.note.as_deref(), Some("no transaction for this intent"));
    }

    #[test]
    fn failed_record_includes_error() {
        let record = ProcessedEvent::failed(
            "evt_789",
            "payment_intent.payment_failed",
            "database connection failed",
            serde_json::json!({}),
        );

        assert_eq!(record.status, ProcessingStatus::Failed);
        assert_eq!(record.note.as_deref(), Some("database connection failed"));
    }

    #[test]
    fn processing_status_round_trips_through_text() {
        for status in [
            ProcessingStatus::Success,
            ProcessingStatus::Ignored,
            ProcessingStatus::Failed,
        ] {
            assert_eq!(ProcessingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProcessingStatus::parse("exploded"), None);
    }

    // Trait object safety test
    #[test]
    fn processed_event_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ProcessedEventStore) {}
    }
}
