//! RedeemCodeHandler - Single-use code redemption.
//!
//! The check order is fixed: syntax, existence, expiry, then the store's
//! conditional update. Concurrent redemptions of the same code are decided
//! by that single update; the loser learns the winner's timestamp from a
//! re-read and reports the code as already redeemed.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::domain::codes::{CreditCode, RedemptionCode, RedemptionError};
use crate::domain::foundation::{EmailAddress, ProductId, Timestamp};
use crate::ports::{AuditEvent, AuditLog, CreditCodeStore, ProductCatalog, RedeemOutcome};

/// Command to redeem one credit code.
#[derive(Debug, Clone)]
pub struct RedeemCodeCommand {
    /// Raw code text as submitted by the client.
    pub code: String,

    /// Who is redeeming.
    pub customer_email: EmailAddress,
}

/// Result of a successful redemption.
#[derive(Debug, Clone)]
pub struct RedeemCodeResult {
    /// Credits granted.
    pub credits: i32,

    /// Display name of the product the credits apply to.
    pub product: String,

    /// When this redemption was recorded.
    pub redeemed_at: Timestamp,
}

/// Handler for redeeming credit codes.
pub struct RedeemCodeHandler {
    codes: Arc<dyn CreditCodeStore>,
    catalog: Arc<dyn ProductCatalog>,
    audit: Arc<dyn AuditLog>,
}

impl RedeemCodeHandler {
    pub fn new(
        codes: Arc<dyn CreditCodeStore>,
        catalog: Arc<dyn ProductCatalog>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            codes,
            catalog,
            audit,
        }
    }

    pub async fn handle(
        &self,
        command: RedeemCodeCommand,
    ) -> Result<RedeemCodeResult, RedemptionError> {
        // 1. Reject malformed text before touching the store.
        let code = RedemptionCode::parse(&command.code)?;

        // 2. Look the code up.
        let Some(credit_code) = self.codes.find_by_code(&code).await? else {
            return Err(RedemptionError::not_found(code.as_str()));
        };

        // 3. Expiry outranks redemption state.
        let now = Timestamp::now();
        if credit_code.is_expired(&now) {
            return Err(RedemptionError::expired(credit_code.expires_at));
        }

        // 4. One conditional update decides the winner.
        match self
            .codes
            .redeem(&code, &command.customer_email, now)
            .await?
        {
            RedeemOutcome::Redeemed(redeemed) => {
                let product = self.product_name(&redeemed.product_id).await;
                self.record_audit(&redeemed, &command.customer_email).await;
                info!(
                    code_id = %redeemed.id,
                    credits = redeemed.credits,
                    "credit code redeemed"
                );
                Ok(RedeemCodeResult {
                    credits: redeemed.credits,
                    product,
                    redeemed_at: redeemed.redeemed_at.unwrap_or(now),
                })
            }
            RedeemOutcome::AlreadyRedeemed => {
                // Lost the race, or the code was spent long ago. Re-read
                // for the winning redemption's timestamp.
                let redeemed_at = self
                    .codes
                    .find_by_code(&code)
                    .await
                    .ok()
                    .flatten()
                    .and_then(|c| c.redeemed_at);
                Err(RedemptionError::already_redeemed(redeemed_at))
            }
        }
    }

    /// Product display name for the response; falls back to the raw id.
    async fn product_name(&self, product_id: &ProductId) -> String {
        match self.catalog.find_product(product_id).await {
            Ok(Some(product)) => product.name,
            Ok(None) => product_id.to_string(),
            Err(err) => {
                warn!(
                    product_id = %product_id,
                    error = %err,
                    "product lookup failed after redemption"
                );
                product_id.to_string()
            }
        }
    }

    async fn record_audit(&self, code: &CreditCode, redeemed_by: &EmailAddress) {
        let event = AuditEvent::new("redeem_code", "credit_codes")
            .with_actor(redeemed_by.as_str())
            .with_detail(json!({
                "code_id": code.id.to_string(),
                "credits": code.credits,
                "product_id": code.product_id.to_string(),
            }));
        if let Err(err) = self.audit.record(&event).await {
            warn!(code_id = %code.id, error = %err, "audit write failed for redemption");
        }
    }
}
