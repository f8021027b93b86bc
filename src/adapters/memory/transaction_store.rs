//! In-memory transaction store for testing.
//!
//! Mirrors the conditional-update semantics of the PostgreSQL store: the
//! whole map is guarded by one lock, so a settle attempt observes and
//! changes the status atomically.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, TransactionId};
use crate::domain::ledger::{Transaction, TransactionStatus, TransitionOutcome};
use crate::ports::TransactionStore;

/// In-memory transaction store for tests and local development.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryTransactionStore {
    transactions: RwLock<Vec<Transaction>>,
}

impl InMemoryTransactionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all stored transactions (for test assertions).
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .read()
            .expect("InMemoryTransactionStore: transactions lock poisoned")
            .clone()
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let mut transactions = self
            .transactions
            .write()
            .expect("InMemoryTransactionStore: transactions lock poisoned");

        if let Some(external_ref) = &transaction.external_payment_ref {
            if transactions
                .iter()
                .any(|t| t.external_payment_ref.as_deref() == Some(external_ref))
            {
                return Err(DomainError::new(
                    ErrorCode::ValidationFailed,
                    "A transaction already exists for this payment reference",
                ));
            }
        }
        if let Some(key) = &transaction.idempotency_key {
            if transactions
                .iter()
                .any(|t| t.idempotency_key.as_deref() == Some(key))
            {
                return Err(DomainError::new(
                    ErrorCode::ValidationFailed,
                    "A transaction already exists for this idempotency key",
                ));
            }
        }

        transactions.push(transaction.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .transactions
            .read()
            .expect("InMemoryTransactionStore: transactions lock poisoned")
            .iter()
            .find(|t| &t.id == id)
            .cloned())
    }

    async fn find_by_external_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .transactions
            .read()
            .expect("InMemoryTransactionStore: transactions lock poisoned")
            .iter()
            .find(|t| t.external_payment_ref.as_deref() == Some(external_ref))
            .cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        Ok(self
            .transactions
            .read()
            .expect("InMemoryTransactionStore: transactions lock poisoned")
            .iter()
            .find(|t| t.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn complete_if_pending(
        &self,
        id: &TransactionId,
        completed_at: Timestamp,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut transactions = self
            .transactions
            .write()
            .expect("InMemoryTransactionStore: transactions lock poisoned");

        let Some(transaction) = transactions.iter_mut().find(|t| &t.id == id) else {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Transaction not found",
            ));
        };

        if transaction.status != TransactionStatus::Pending {
            return Ok(TransitionOutcome::AlreadySettled(transaction.clone()));
        }

        transaction.complete(completed_at)?;
        Ok(TransitionOutcome::Applied(transaction.clone()))
    }

    async fn fail_if_pending(
        &self,
        id: &TransactionId,
        failed_at: Timestamp,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut transactions = self
            .transactions
            .write()
            .expect("InMemoryTransactionStore: transactions lock poisoned");

        let Some(transaction) = transactions.iter_mut().find(|t| &t.id == id) else {
            return Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Transaction not found",
            ));
        };

        if transaction.status != TransactionStatus::Pending {
            return Ok(TransitionOutcome::AlreadySettled(transaction.clone()));
        }

        transaction.fail(failed_at)?;
        Ok(TransitionOutcome::Applied(transaction.clone()))
    }
}
