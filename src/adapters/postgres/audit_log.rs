//! PostgreSQL implementation of AuditLog.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{AuditEvent, AuditLog};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the AuditLog port.
///
/// Append-only; entries are never updated or deleted by the application.
pub struct PostgresAuditLog {
    pool: PgPool,
}

impl PostgresAuditLog {
    /// Creates a new PostgresAuditLog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn record(&self, event: &AuditEvent) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (id, actor, action, resource_type, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.actor)
        .bind(&event.action)
        .bind(&event.resource_type)
        .bind(&event.detail)
        .bind(event.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record audit event: {}", e),
            )
        })?;

        Ok(())
    }
}
