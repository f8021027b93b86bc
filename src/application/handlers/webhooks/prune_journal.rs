//! Prunes old records from the processed-event journal.
//!
//! The journal only needs to cover the gateway's redelivery window plus
//! some slack for investigations, so a background task trims everything
//! older than the retention period.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::ProcessedEventStore;

/// Default retention for processed webhook events, in days.
pub const DEFAULT_RETAIN_DAYS: i64 = 30;

/// Command to prune the processed-event journal.
#[derive(Debug, Clone)]
pub struct PruneJournalCommand {
    /// Records processed more than this many days ago are deleted.
    pub retain_days: i64,
}

impl Default for PruneJournalCommand {
    fn default() -> Self {
        Self {
            retain_days: DEFAULT_RETAIN_DAYS,
        }
    }
}

/// Handler that trims the processed-event journal to its retention window.
pub struct PruneJournalHandler {
    processed_events: Arc<dyn ProcessedEventStore>,
}

impl PruneJournalHandler {
    pub fn new(processed_events: Arc<dyn ProcessedEventStore>) -> Self {
        Self { processed_events }
    }

    /// Deletes journal records older than the retention period.
    ///
    /// Returns the number of records removed.
    pub async fn handle(&self, command: PruneJournalCommand) -> Result<u64, DomainError> {
        // 1. Guard the retention period. A non-positive value would
        //    empty the journal and reopen the redelivery window.
        if command.retain_days < 1 {
            return Err(DomainError::new(
                ErrorCode::OutOfRange,
                "retention period must be at least one day",
            )
            .with_detail("retain_days", command.retain_days.to_string()));
        }

        // 2. Delete everything processed before the cutoff.
        let cutoff = Timestamp::now().minus_days(command.retain_days);
        let removed = self.processed_events.delete_before(cutoff).await?;

        if removed > 0 {
            info!(
                removed,
                retain_days = command.retain_days,
                "pruned processed-event journal"
            );
        }
        Ok(removed)
    }
}
