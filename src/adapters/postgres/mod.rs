//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresProductCatalog` - Product and credit package reads
//! - `PostgresTransactionStore` - Transaction ledger with conditional settlement
//! - `PostgresCreditCodeStore` - Credit codes with single-winner redemption
//! - `PostgresInventoryStore` - Distributor inventory balances
//! - `PostgresAuditLog` - Append-only audit trail
//! - `PostgresProcessedEventStore` - Webhook delivery deduplication

mod audit_log;
mod credit_code_store;
mod inventory_store;
mod processed_event_store;
mod product_catalog;
mod transaction_store;

pub use audit_log::PostgresAuditLog;
pub use credit_code_store::PostgresCreditCodeStore;
pub use inventory_store::PostgresInventoryStore;
pub use processed_event_store::PostgresProcessedEventStore;
pub use product_catalog::PostgresProductCatalog;
pub use transaction_store::PostgresTransactionStore;
