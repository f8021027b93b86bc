//! PostgreSQL implementation of ProductCatalog.
//!
//! Read-only queries over the `products` and `credit_packages` tables.

use crate::domain::catalog::{CreditPackage, Product, ProductStatus};
use crate::domain::foundation::{DomainError, ErrorCode, PackageId, ProductId, Timestamp};
use crate::ports::ProductCatalog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// PostgreSQL implementation of the ProductCatalog port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    /// Creates a new PostgresProductCatalog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a product.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    credit_costs: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let status = ProductStatus::parse(&row.status).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid product status: {}", e),
            )
        })?;

        let credit_costs: HashMap<String, i32> =
            serde_json::from_value(row.credit_costs).map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid credit_costs payload: {}", e),
                )
            })?;

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            credit_costs,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

/// Database row representation of a credit package.
#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    product_id: Uuid,
    name: String,
    credits: i32,
    price: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<PackageRow> for CreditPackage {
    fn from(row: PackageRow) -> Self {
        CreditPackage {
            id: PackageId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            name: row.name,
            credits: row.credits,
            price: row.price,
            is_active: row.is_active,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn list_active_products(&self) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, credit_costs, status, created_at
            FROM products
            WHERE status = 'active'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list products: {}", e),
            )
        })?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, credit_costs, status, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find product: {}", e),
            )
        })?;

        row.map(Product::try_from).transpose()
    }

    async fn find_package(&self, id: &PackageId) -> Result<Option<CreditPackage>, DomainError> {
        let row: Option<PackageRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, name, credits, price, is_active, created_at
            FROM credit_packages
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find package: {}", e),
            )
        })?;

        Ok(row.map(CreditPackage::from))
    }

    async fn list_active_packages(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<CreditPackage>, DomainError> {
        let rows: Vec<PackageRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, name, credits, price, is_active, created_at
            FROM credit_packages
            WHERE product_id = $1 AND is_active = TRUE
            ORDER BY credits ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list packages: {}", e),
            )
        })?;

        Ok(rows.into_iter().map(CreditPackage::from).collect())
    }
}
