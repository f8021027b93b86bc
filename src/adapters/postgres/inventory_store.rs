//! PostgreSQL implementation of InventoryStore.

use crate::domain::foundation::{DistributorId, DomainError, ErrorCode, ProductId};
use crate::ports::InventoryStore;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the InventoryStore port.
///
/// Balances live in one row per (distributor, product) pair; additions
/// are a single upsert so concurrent batch issuances never lose credits.
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgresInventoryStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    async fn add_credits(
        &self,
        distributor_id: &DistributorId,
        product_id: &ProductId,
        credits: i64,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO distributor_inventory (distributor_id, product_id, credits)
            VALUES ($1, $2, $3)
            ON CONFLICT (distributor_id, product_id)
            DO UPDATE SET credits = distributor_inventory.credits + EXCLUDED.credits,
                          updated_at = now()
            "#,
        )
        .bind(distributor_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(credits)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to add inventory credits: {}", e),
            )
        })?;

        Ok(())
    }

    async fn balance(
        &self,
        distributor_id: &DistributorId,
        product_id: &ProductId,
    ) -> Result<i64, DomainError> {
        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT credits FROM distributor_inventory
            WHERE distributor_id = $1 AND product_id = $2
            "#,
        )
        .bind(distributor_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to read inventory balance: {}", e),
            )
        })?;

        Ok(balance.unwrap_or(0))
    }
}
