//! GenerateBatchHandler - Admin and distributor code batch generation.
//!
//! The non-purchase issuance path: an admin mints stock codes for any
//! product, a distributor mints codes for their own account. The caller's
//! capability arrives pre-resolved; this handler checks it and never
//! re-derives roles.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::codes::{CodeGenerator, CreditCode, IssuanceError, IssueSpec};
use crate::domain::foundation::{
    Capability, DistributorId, DomainError, ErrorCode, ProductId, Timestamp, ValidationError,
};
use crate::ports::{AuditEvent, AuditLog, CreditCodeStore, InventoryStore, ProductCatalog};

/// Largest batch one call may mint.
pub const MAX_BATCH_SIZE: u32 = 1000;

/// Longest allowed code lifetime, in days.
pub const MAX_EXPIRY_DAYS: i64 = 3650;

/// Command to generate a batch of credit codes.
#[derive(Debug, Clone)]
pub struct GenerateBatchCommand {
    /// Resolved capability of the caller.
    pub capability: Capability,

    /// Product the codes apply to.
    pub product_id: ProductId,

    /// Credits granted by each code.
    pub credits: i32,

    /// Number of codes to mint.
    pub quantity: u32,

    /// Distributor receiving the batch; `None` mints admin stock.
    pub distributor_id: Option<DistributorId>,

    /// Wholesale price per code, when the batch was sold.
    pub purchase_price: Option<Decimal>,

    /// Days until the codes expire.
    pub expires_in_days: i64,
}

/// Result of batch generation.
#[derive(Debug, Clone)]
pub struct GenerateBatchResult {
    /// The codes actually minted.
    pub codes: Vec<CreditCode>,

    /// How many codes the command asked for.
    pub requested: u32,
}

impl GenerateBatchResult {
    /// True when some slots failed and the batch came up short.
    pub fn is_partial(&self) -> bool {
        self.codes.len() < self.requested as usize
    }
}

/// Handler for minting code batches outside the purchase flow.
pub struct GenerateBatchHandler {
    catalog: Arc<dyn ProductCatalog>,
    inventory: Arc<dyn InventoryStore>,
    audit: Arc<dyn AuditLog>,
    generator: CodeGenerator,
}

impl GenerateBatchHandler {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        codes: Arc<dyn CreditCodeStore>,
        inventory: Arc<dyn InventoryStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let generator = CodeGenerator::new(codes);
        Self {
            catalog,
            inventory,
            audit,
            generator,
        }
    }

    pub async fn handle(
        &self,
        command: GenerateBatchCommand,
    ) -> Result<GenerateBatchResult, DomainError> {
        // 1. Authorization first: admins mint for anyone, distributors only
        //    for themselves.
        command
            .capability
            .require_issue_for(command.distributor_id.as_ref())?;

        // 2. Validate the batch shape before touching the store.
        if command.quantity < 1 || command.quantity > MAX_BATCH_SIZE {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                MAX_BATCH_SIZE as i32,
                command.quantity.min(i32::MAX as u32) as i32,
            )
            .into());
        }
        if command.credits <= 0 {
            return Err(
                ValidationError::out_of_range("credits", 1, i32::MAX, command.credits).into(),
            );
        }
        if command.expires_in_days < 1 || command.expires_in_days > MAX_EXPIRY_DAYS {
            return Err(ValidationError::out_of_range(
                "expires_in_days",
                1,
                MAX_EXPIRY_DAYS as i32,
                command.expires_in_days.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            )
            .into());
        }

        // 3. The product must exist and be sellable.
        let product = self
            .catalog
            .find_product(&command.product_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::ProductNotFound, "Product not found"))?;
        if !product.is_purchasable() {
            return Err(DomainError::new(
                ErrorCode::ProductNotActive,
                "Product is not active",
            ));
        }

        // 4. Mint the batch, skipping slots that fail.
        let spec = IssueSpec {
            credits: command.credits,
            product_id: command.product_id,
            transaction_id: None,
            distributor_id: command.distributor_id,
            customer_email: None,
            purchase_price: command.purchase_price,
            expires_at: Timestamp::now().add_days(command.expires_in_days),
        };
        let mut minted = Vec::with_capacity(command.quantity as usize);
        for slot in 1..=command.quantity {
            match self.generator.mint(&spec).await {
                Ok(code) => minted.push(code),
                Err(err) => {
                    warn!(
                        product_id = %command.product_id,
                        slot,
                        quantity = command.quantity,
                        error = %err,
                        "batch code mint failed, continuing"
                    );
                }
            }
        }
        if minted.is_empty() {
            return Err(IssuanceError::none_issued(command.quantity).into());
        }

        // 5. Credit distributor inventory. Best-effort: the codes themselves
        //    are the record.
        if let Some(distributor_id) = &command.distributor_id {
            let total = i64::from(command.credits) * minted.len() as i64;
            if let Err(err) = self
                .inventory
                .add_credits(distributor_id, &command.product_id, total)
                .await
            {
                warn!(
                    distributor_id = %distributor_id,
                    credits = total,
                    error = %err,
                    "inventory credit failed after batch generation"
                );
            }
        }

        // 6. Audit the batch. Best-effort.
        let mut detail = json!({
            "product_id": command.product_id.to_string(),
            "credits_per_code": command.credits,
            "codes_generated": minted.len(),
            "codes_requested": command.quantity,
            "expires_in_days": command.expires_in_days,
        });
        if let Some(distributor_id) = &command.distributor_id {
            detail["distributor_id"] = json!(distributor_id.to_string());
        }
        let event = AuditEvent::new("generate_credit_codes", "credit_codes")
            .with_actor(command.capability.to_string())
            .with_detail(detail);
        if let Err(err) = self.audit.record(&event).await {
            warn!(error = %err, "audit write failed for batch generation");
        }

        info!(
            product_id = %command.product_id,
            generated = minted.len(),
            requested = command.quantity,
            "code batch generated"
        );
        Ok(GenerateBatchResult {
            codes: minted,
            requested: command.quantity,
        })
    }
}
