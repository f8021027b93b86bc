//! Webhook handlers.
//!
//! Reconciliation of payment gateway deliveries: settle or fail the
//! matching transaction, record disputes, journal every processed event.

mod process_event;
mod prune_journal;

pub use process_event::{ProcessEventCommand, ProcessEventHandler, ProcessEventResult};
pub use prune_journal::{PruneJournalCommand, PruneJournalHandler, DEFAULT_RETAIN_DAYS};
