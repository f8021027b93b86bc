//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the credit platform domain.

mod capability;
mod email;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use capability::Capability;
pub use email::EmailAddress;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    AuditEventId, CreditCodeId, DistributorId, PackageId, ProductId, TransactionId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
