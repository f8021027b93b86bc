//! Transaction store port.
//!
//! Defines the contract for persisting purchase transactions. Settlement
//! goes through conditional updates (`... WHERE status = 'pending'`) so
//! the customer-facing confirm call and the gateway webhook can race
//! without double-completing a purchase.
//!
//! # Design
//!
//! - **One row per intent**: `external_payment_ref` is unique, so retried
//!   intent creation reuses the pending row instead of inserting twice
//! - **Idempotency keys**: client-supplied keys are unique when present
//! - **First settle wins**: both settle methods report `AlreadySettled`
//!   with the current row when the transaction is already terminal

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, TransactionId};
use crate::domain::ledger::{Transaction, TransitionOutcome};

/// Port for transaction persistence.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a new pending transaction.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the external ref or idempotency key is taken
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// Find a transaction by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError>;

    /// Find a transaction by the gateway's payment reference.
    ///
    /// This is the webhook-side lookup; the gateway only knows its own
    /// intent ID.
    async fn find_by_external_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Find a transaction by its client-supplied idempotency key.
    ///
    /// Returns `None` if no transaction carries this key.
    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Atomically complete a transaction if it is still pending.
    ///
    /// Returns `Applied` with the completed row if this caller won, or
    /// `AlreadySettled` with the current row if the transaction reached a
    /// terminal status first.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` if no such transaction exists
    /// - `DatabaseError` on persistence failure
    async fn complete_if_pending(
        &self,
        id: &TransactionId,
        completed_at: Timestamp,
    ) -> Result<TransitionOutcome, DomainError>;

    /// Atomically fail a transaction if it is still pending.
    ///
    /// Same contract as [`complete_if_pending`](Self::complete_if_pending)
    /// with the failed status.
    async fn fail_if_pending(
        &self,
        id: &TransactionId,
        failed_at: Timestamp,
    ) -> Result<TransitionOutcome, DomainError>;
}
