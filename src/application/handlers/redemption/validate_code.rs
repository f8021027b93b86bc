//! ValidateCodeHandler - Read-only code preview.
//!
//! Runs the same check ladder as redemption (syntax, existence, expiry,
//! redemption state) but never writes. Invalid outcomes are part of the
//! normal result, not errors; only store failures surface as errors.

use std::sync::Arc;

use crate::domain::codes::{RedemptionCode, RedemptionError};
use crate::domain::foundation::{DomainError, ProductId, Timestamp};
use crate::ports::{CreditCodeStore, ProductCatalog};

/// Query to check a code without redeeming it.
#[derive(Debug, Clone)]
pub struct ValidateCodeQuery {
    /// Raw code text as submitted by the client.
    pub code: String,
}

/// What a validation learned about the code.
#[derive(Debug, Clone)]
pub enum ValidateCodeResult {
    /// The code is redeemable right now.
    Valid {
        credits: i32,
        product: String,
        expires_at: Timestamp,
    },

    /// The code cannot be redeemed; the error says why.
    Invalid { error: RedemptionError },
}

impl ValidateCodeResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidateCodeResult::Valid { .. })
    }
}

/// Handler for the read-only validation endpoint.
pub struct ValidateCodeHandler {
    codes: Arc<dyn CreditCodeStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl ValidateCodeHandler {
    pub fn new(codes: Arc<dyn CreditCodeStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { codes, catalog }
    }

    pub async fn handle(
        &self,
        query: ValidateCodeQuery,
    ) -> Result<ValidateCodeResult, DomainError> {
        // 1. Syntax first; malformed text never reaches the store.
        let code = match RedemptionCode::parse(&query.code) {
            Ok(code) => code,
            Err(err) => {
                return Ok(ValidateCodeResult::Invalid { error: err.into() });
            }
        };

        // 2. Existence.
        let Some(credit_code) = self.codes.find_by_code(&code).await? else {
            return Ok(ValidateCodeResult::Invalid {
                error: RedemptionError::not_found(code.as_str()),
            });
        };

        // 3. Expiry, then redemption state, in the same order redemption
        //    itself applies them.
        let now = Timestamp::now();
        if credit_code.is_expired(&now) {
            return Ok(ValidateCodeResult::Invalid {
                error: RedemptionError::expired(credit_code.expires_at),
            });
        }
        if credit_code.is_redeemed {
            return Ok(ValidateCodeResult::Invalid {
                error: RedemptionError::already_redeemed(credit_code.redeemed_at),
            });
        }

        let product = self.product_name(&credit_code.product_id).await?;
        Ok(ValidateCodeResult::Valid {
            credits: credit_code.credits,
            product,
            expires_at: credit_code.expires_at,
        })
    }

    /// Product display name; falls back to the raw id when unknown.
    async fn product_name(&self, product_id: &ProductId) -> Result<String, DomainError> {
        Ok(self
            .catalog
            .find_product(product_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| product_id.to_string()))
    }
}
