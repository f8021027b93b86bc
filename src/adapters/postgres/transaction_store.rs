//! PostgreSQL implementation of TransactionStore.
//!
//! Settlement is a single conditional update (`... WHERE status = 'pending'`);
//! the database row is the serialization point when the customer-facing
//! confirm call and the gateway webhook race.

use crate::domain::foundation::{
    DistributorId, DomainError, EmailAddress, ErrorCode, ProductId, Timestamp, TransactionId,
};
use crate::domain::ledger::{Transaction, TransactionKind, TransactionStatus, TransitionOutcome};
use crate::ports::TransactionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the TransactionStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    /// Creates a new PostgresTransactionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    kind: String,
    amount: Decimal,
    credits: i32,
    customer_email: String,
    product_id: Uuid,
    distributor_id: Option<Uuid>,
    external_payment_ref: Option<String>,
    idempotency_key: Option<String>,
    status: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind = TransactionKind::parse(&row.kind).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid transaction kind: {}", e),
            )
        })?;
        let status = TransactionStatus::parse(&row.status).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid transaction status: {}", e),
            )
        })?;
        let customer_email = EmailAddress::new(row.customer_email).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid customer email: {}", e),
            )
        })?;

        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            kind,
            amount: row.amount,
            credits: row.credits,
            customer_email,
            product_id: ProductId::from_uuid(row.product_id),
            distributor_id: row.distributor_id.map(DistributorId::from_uuid),
            external_payment_ref: row.external_payment_ref,
            idempotency_key: row.idempotency_key,
            status,
            metadata: row.metadata,
            created_at: Timestamp::from_datetime(row.created_at),
            completed_at: row.completed_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, kind, amount, credits, customer_email, product_id, distributor_id,
                external_payment_ref, idempotency_key, status, metadata, created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(transaction.credits)
        .bind(transaction.customer_email.as_str())
        .bind(transaction.product_id.as_uuid())
        .bind(transaction.distributor_id.as_ref().map(|d| *d.as_uuid()))
        .bind(&transaction.external_payment_ref)
        .bind(&transaction.idempotency_key)
        .bind(transaction.status.as_str())
        .bind(&transaction.metadata)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.completed_at.as_ref().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("transactions_external_payment_ref_key") {
                    return DomainError::new(
                        ErrorCode::ValidationFailed,
                        "A transaction already exists for this payment reference",
                    );
                }
                if db_err.constraint() == Some("transactions_idempotency_key_key") {
                    return DomainError::new(
                        ErrorCode::ValidationFailed,
                        "A transaction already exists for this idempotency key",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert transaction: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, kind, amount, credits, customer_email, product_id, distributor_id,
                   external_payment_ref, idempotency_key, status, metadata, created_at, completed_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find transaction: {}", e),
            )
        })?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_external_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, kind, amount, credits, customer_email, product_id, distributor_id,
                   external_payment_ref, idempotency_key, status, metadata, created_at, completed_at
            FROM transactions
            WHERE external_payment_ref = $1
            "#,
        )
        .bind(external_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find transaction: {}", e),
            )
        })?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_idempotency_key(
        &self,
        key: &str,
    ) -> Result<Option<Transaction>, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, kind, amount, credits, customer_email, product_id, distributor_id,
                   external_payment_ref, idempotency_key, status, metadata, created_at, completed_at
            FROM transactions
            WHERE idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find transaction: {}", e),
            )
        })?;

        row.map(Transaction::try_from).transpose()
    }

    async fn complete_if_pending(
        &self,
        id: &TransactionId,
        completed_at: Timestamp,
    ) -> Result<TransitionOutcome, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            UPDATE transactions
            SET status = 'completed', completed_at = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING id, kind, amount, credits, customer_email, product_id, distributor_id,
                      external_payment_ref, idempotency_key, status, metadata, created_at, completed_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(completed_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to complete transaction: {}", e),
            )
        })?;

        if let Some(row) = row {
            return Ok(TransitionOutcome::Applied(Transaction::try_from(row)?));
        }

        // No pending row was updated; re-read to distinguish a lost race
        // from a transaction that never existed
        match self.find_by_id(id).await? {
            Some(transaction) => Ok(TransitionOutcome::AlreadySettled(transaction)),
            None => Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Transaction not found",
            )),
        }
    }

    async fn fail_if_pending(
        &self,
        id: &TransactionId,
        failed_at: Timestamp,
    ) -> Result<TransitionOutcome, DomainError> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            UPDATE transactions
            SET status = 'failed', completed_at = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING id, kind, amount, credits, customer_email, product_id, distributor_id,
                      external_payment_ref, idempotency_key, status, metadata, created_at, completed_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(failed_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fail transaction: {}", e),
            )
        })?;

        if let Some(row) = row {
            return Ok(TransitionOutcome::Applied(Transaction::try_from(row)?));
        }

        match self.find_by_id(id).await? {
            Some(transaction) => Ok(TransitionOutcome::AlreadySettled(transaction)),
            None => Err(DomainError::new(
                ErrorCode::TransactionNotFound,
                "Transaction not found",
            )),
        }
    }
}
