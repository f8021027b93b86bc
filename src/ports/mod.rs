//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `ProductCatalog` - Read access to products and credit packages
//! - `TransactionStore` - Purchase transactions with conditional settlement
//! - `CreditCodeStore` - Credit codes with insert-if-absent and
//!   redeem-if-unredeemed conditional writes
//! - `InventoryStore` - Distributor credit balances
//! - `AuditLog` - Append-only audit trail
//! - `ProcessedEventStore` - Webhook idempotency tracking
//!
//! ## Integration Ports
//!
//! - `PaymentGateway` - External card processor (intents + webhooks)
//! - `NotificationSink` - Outbound customer notifications

mod audit_log;
mod credit_code_store;
mod inventory_store;
mod notifications;
mod payment_gateway;
mod processed_event_store;
mod product_catalog;
mod transaction_store;

pub use audit_log::{AuditEvent, AuditLog};
pub use credit_code_store::{CreditCodeStore, InsertOutcome, RedeemOutcome};
pub use inventory_store::InventoryStore;
pub use notifications::{NotificationSink, PurchaseReceipt};
pub use payment_gateway::{
    CreateIntentRequest, GatewayError, GatewayErrorCode, PaymentGateway, PaymentIntent,
    PaymentIntentStatus,
};
pub use processed_event_store::{
    ProcessedEvent, ProcessedEventStore, ProcessingStatus, SaveResult,
};
pub use product_catalog::ProductCatalog;
pub use transaction_store::TransactionStore;
