//! PostgreSQL implementation of CreditCodeStore.
//!
//! Redemption is a single conditional update (`... WHERE is_redeemed = FALSE`);
//! exactly one of any number of concurrent redeemers gets the updated row back.

use crate::domain::codes::{CreditCode, RedemptionCode};
use crate::domain::foundation::{
    CreditCodeId, DistributorId, DomainError, EmailAddress, ErrorCode, ProductId, Timestamp,
    TransactionId,
};
use crate::ports::{CreditCodeStore, InsertOutcome, RedeemOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the CreditCodeStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresCreditCodeStore {
    pool: PgPool,
}

impl PostgresCreditCodeStore {
    /// Creates a new PostgresCreditCodeStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a credit code.
#[derive(Debug, sqlx::FromRow)]
struct CodeRow {
    id: Uuid,
    code: String,
    credits: i32,
    product_id: Uuid,
    transaction_id: Option<Uuid>,
    distributor_id: Option<Uuid>,
    customer_email: Option<String>,
    purchase_price: Option<Decimal>,
    expires_at: DateTime<Utc>,
    is_redeemed: bool,
    redeemed_at: Option<DateTime<Utc>>,
    redeemed_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CodeRow> for CreditCode {
    type Error = DomainError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        let code = RedemptionCode::parse(&row.code).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid redemption code: {}", e),
            )
        })?;
        let customer_email = row.customer_email.map(EmailAddress::new).transpose().map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid customer email: {}", e),
            )
        })?;
        let redeemed_by = row.redeemed_by.map(EmailAddress::new).transpose().map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid redeemer email: {}", e),
            )
        })?;

        Ok(CreditCode {
            id: CreditCodeId::from_uuid(row.id),
            code,
            credits: row.credits,
            product_id: ProductId::from_uuid(row.product_id),
            transaction_id: row.transaction_id.map(TransactionId::from_uuid),
            distributor_id: row.distributor_id.map(DistributorId::from_uuid),
            customer_email,
            purchase_price: row.purchase_price,
            expires_at: Timestamp::from_datetime(row.expires_at),
            is_redeemed: row.is_redeemed,
            redeemed_at: row.redeemed_at.map(Timestamp::from_datetime),
            redeemed_by,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl CreditCodeStore for PostgresCreditCodeStore {
    async fn insert_if_absent(&self, credit_code: &CreditCode) -> Result<InsertOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO credit_codes (
                id, code, credits, product_id, transaction_id, distributor_id, customer_email,
                purchase_price, expires_at, is_redeemed, redeemed_at, redeemed_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(credit_code.id.as_uuid())
        .bind(credit_code.code.as_str())
        .bind(credit_code.credits)
        .bind(credit_code.product_id.as_uuid())
        .bind(credit_code.transaction_id.as_ref().map(|t| *t.as_uuid()))
        .bind(credit_code.distributor_id.as_ref().map(|d| *d.as_uuid()))
        .bind(credit_code.customer_email.as_ref().map(|e| e.as_str()))
        .bind(credit_code.purchase_price)
        .bind(credit_code.expires_at.as_datetime())
        .bind(credit_code.is_redeemed)
        .bind(credit_code.redeemed_at.as_ref().map(|t| *t.as_datetime()))
        .bind(credit_code.redeemed_by.as_ref().map(|e| e.as_str()))
        .bind(credit_code.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert credit code: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(InsertOutcome::DuplicateCode);
        }

        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_code(
        &self,
        code: &RedemptionCode,
    ) -> Result<Option<CreditCode>, DomainError> {
        let row: Option<CodeRow> = sqlx::query_as(
            r#"
            SELECT id, code, credits, product_id, transaction_id, distributor_id, customer_email,
                   purchase_price, expires_at, is_redeemed, redeemed_at, redeemed_by, created_at
            FROM credit_codes
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find credit code: {}", e),
            )
        })?;

        row.map(CreditCode::try_from).transpose()
    }

    async fn redeem(
        &self,
        code: &RedemptionCode,
        redeemer: &EmailAddress,
        redeemed_at: Timestamp,
    ) -> Result<RedeemOutcome, DomainError> {
        let row: Option<CodeRow> = sqlx::query_as(
            r#"
            UPDATE credit_codes
            SET is_redeemed = TRUE, redeemed_by = $2, redeemed_at = $3
            WHERE code = $1 AND is_redeemed = FALSE
            RETURNING id, code, credits, product_id, transaction_id, distributor_id, customer_email,
                      purchase_price, expires_at, is_redeemed, redeemed_at, redeemed_by, created_at
            "#,
        )
        .bind(code.as_str())
        .bind(redeemer.as_str())
        .bind(redeemed_at.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to redeem credit code: {}", e),
            )
        })?;

        if let Some(row) = row {
            return Ok(RedeemOutcome::Redeemed(CreditCode::try_from(row)?));
        }

        // No unredeemed row was updated; re-read to distinguish a lost race
        // from a code that never existed
        match self.find_by_code(code).await? {
            Some(_) => Ok(RedeemOutcome::AlreadyRedeemed),
            None => Err(DomainError::new(ErrorCode::NotFound, "No such code")),
        }
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<CreditCode>, DomainError> {
        let rows: Vec<CodeRow> = sqlx::query_as(
            r#"
            SELECT id, code, credits, product_id, transaction_id, distributor_id, customer_email,
                   purchase_price, expires_at, is_redeemed, redeemed_at, redeemed_by, created_at
            FROM credit_codes
            WHERE transaction_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(transaction_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find credit codes: {}", e),
            )
        })?;

        rows.into_iter().map(CreditCode::try_from).collect()
    }
}
