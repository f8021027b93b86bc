//! IssueCodesHandler - Shared code issuance for settled purchases.
//!
//! Both completion paths (the synchronous confirm call and the webhook
//! reconciler) delegate here after winning the ledger's pending→completed
//! transition. The handler itself is safe to call twice for the same
//! transaction: it first checks for an existing batch and returns it
//! untouched, so a crashed-and-retried winner never double-issues.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::codes::{CodeGenerator, CreditCode, IssuanceError, IssueSpec, CODE_LIFETIME_DAYS};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::ledger::Transaction;
use crate::ports::{AuditEvent, AuditLog, CreditCodeStore, InventoryStore};

/// Command to issue the credit codes a settled transaction paid for.
///
/// Callers must only send transactions whose pending→completed edge they
/// themselves won; the loser of that race reads the winner's batch instead.
#[derive(Debug, Clone)]
pub struct IssueCodesCommand {
    pub transaction: Transaction,
}

/// Result of code issuance.
#[derive(Debug, Clone)]
pub enum IssueCodesResult {
    /// A fresh batch was minted by this call.
    Issued(Vec<CreditCode>),

    /// The transaction already had codes; they are returned unchanged.
    AlreadyIssued(Vec<CreditCode>),
}

impl IssueCodesResult {
    /// The issued codes, fresh or pre-existing.
    pub fn codes(&self) -> &[CreditCode] {
        match self {
            IssueCodesResult::Issued(codes) | IssueCodesResult::AlreadyIssued(codes) => codes,
        }
    }

    /// Consumes the result, yielding the codes.
    pub fn into_codes(self) -> Vec<CreditCode> {
        match self {
            IssueCodesResult::Issued(codes) | IssueCodesResult::AlreadyIssued(codes) => codes,
        }
    }

    /// True when this call minted nothing because a batch already existed.
    pub fn was_already_issued(&self) -> bool {
        matches!(self, IssueCodesResult::AlreadyIssued(_))
    }
}

/// Handler that mints a transaction's code batch.
///
/// Mint failures mid-batch are tolerated: already-persisted codes stay, the
/// failed slot is skipped, and the call still succeeds with the subset. Only
/// a batch where nothing could be minted is an error.
pub struct IssueCodesHandler {
    codes: Arc<dyn CreditCodeStore>,
    inventory: Arc<dyn InventoryStore>,
    audit: Arc<dyn AuditLog>,
    generator: CodeGenerator,
}

impl IssueCodesHandler {
    pub fn new(
        codes: Arc<dyn CreditCodeStore>,
        inventory: Arc<dyn InventoryStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let generator = CodeGenerator::new(Arc::clone(&codes));
        Self {
            codes,
            inventory,
            audit,
            generator,
        }
    }

    pub async fn handle(
        &self,
        command: IssueCodesCommand,
    ) -> Result<IssueCodesResult, DomainError> {
        let tx = &command.transaction;

        // 1. If a batch already exists for this transaction, return it as-is.
        let existing = self.codes.find_by_transaction(&tx.id).await?;
        if !existing.is_empty() {
            info!(
                transaction_id = %tx.id,
                count = existing.len(),
                "transaction already has issued codes"
            );
            return Ok(IssueCodesResult::AlreadyIssued(existing));
        }

        // 2. Mint the batch, skipping slots that fail.
        let quantity = tx.code_quantity();
        let spec = self.issue_spec_for(tx, quantity);
        let mut issued = Vec::with_capacity(quantity as usize);
        for slot in 1..=quantity {
            match self.generator.mint(&spec).await {
                Ok(code) => issued.push(code),
                Err(err) => {
                    warn!(
                        transaction_id = %tx.id,
                        slot,
                        quantity,
                        error = %err,
                        "code mint failed, continuing batch"
                    );
                }
            }
        }
        if issued.is_empty() {
            return Err(IssuanceError::none_issued(quantity).into());
        }

        // 3. Credit distributor inventory when the codes have a distributor
        //    recipient. Best-effort: the codes themselves are the record.
        if let Some(distributor_id) = &tx.distributor_id {
            let total = i64::from(tx.credits) * issued.len() as i64;
            if let Err(err) = self
                .inventory
                .add_credits(distributor_id, &tx.product_id, total)
                .await
            {
                warn!(
                    distributor_id = %distributor_id,
                    credits = total,
                    error = %err,
                    "inventory credit failed after issuance"
                );
            }
        }

        // 4. Audit the completed purchase. Best-effort.
        let event = AuditEvent::new("purchase_completed", "transactions")
            .with_actor(tx.customer_email.as_str())
            .with_detail(json!({
                "transaction_id": tx.id.to_string(),
                "credits_per_code": tx.credits,
                "codes_issued": issued.len(),
                "codes_requested": quantity,
            }));
        if let Err(err) = self.audit.record(&event).await {
            warn!(transaction_id = %tx.id, error = %err, "audit write failed for purchase completion");
        }

        info!(
            transaction_id = %tx.id,
            issued = issued.len(),
            requested = quantity,
            "credit codes issued"
        );
        Ok(IssueCodesResult::Issued(issued))
    }

    /// Builds the per-code issue spec from the transaction.
    ///
    /// The stored purchase price is the per-code share of the charge, so a
    /// multi-code purchase divides the total across the batch.
    fn issue_spec_for(&self, tx: &Transaction, quantity: u32) -> IssueSpec {
        let unit_price = (tx.amount / Decimal::from(quantity)).round_dp(2);
        IssueSpec {
            credits: tx.credits,
            product_id: tx.product_id,
            transaction_id: Some(tx.id),
            distributor_id: tx.distributor_id,
            customer_email: Some(tx.customer_email.clone()),
            purchase_price: Some(unit_price),
            expires_at: Timestamp::now().add_days(CODE_LIFETIME_DAYS),
        }
    }
}
