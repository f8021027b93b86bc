//! In-memory adapters - Deterministic implementations for tests and
//! local development.
//!
//! Each store mirrors the conditional-update semantics of its PostgreSQL
//! counterpart under a single lock, so concurrency tests exercise the
//! same win/lose outcomes the database decides in production.

mod audit_log;
mod credit_code_store;
mod inventory_store;
mod processed_event_store;
mod product_catalog;
mod transaction_store;

pub use audit_log::InMemoryAuditLog;
pub use credit_code_store::InMemoryCreditCodeStore;
pub use inventory_store::InMemoryInventoryStore;
pub use processed_event_store::InMemoryProcessedEventStore;
pub use product_catalog::InMemoryProductCatalog;
pub use transaction_store::InMemoryTransactionStore;
