//! CreateIntentHandler - Opens a purchase against the payment gateway.
//!
//! Validates the catalog selection, creates a gateway payment intent, and
//! opens the pending ledger row that the confirm call and the webhook
//! reconciler later race to settle.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::foundation::{
    DomainError, EmailAddress, ErrorCode, PackageId, ProductId, TransactionId,
};
use crate::domain::ledger::{PurchaseSpec, Transaction};
use crate::ports::{CreateIntentRequest, PaymentGateway, ProductCatalog, TransactionStore};

/// Currency every package price is denominated in.
const CURRENCY: &str = "usd";

/// Command to open a purchase for one credit package.
#[derive(Debug, Clone)]
pub struct CreateIntentCommand {
    pub product_id: ProductId,
    pub package_id: PackageId,
    pub customer_email: EmailAddress,

    /// Client-supplied key; a retried open with the same key returns the
    /// intent already on file instead of charging twice.
    pub idempotency_key: Option<String>,
}

/// Result of opening a purchase.
#[derive(Debug, Clone)]
pub struct CreateIntentResult {
    /// Secret the frontend uses to collect the payment.
    pub client_secret: Option<String>,

    /// Gateway intent id (`pi_...`).
    pub intent_id: String,

    /// Amount that will be charged, in major units.
    pub amount: Decimal,

    /// Lowercase ISO currency code.
    pub currency: String,

    /// The pending ledger row opened for this purchase.
    pub transaction_id: TransactionId,
}

/// Handler that opens payment intents.
pub struct CreateIntentHandler {
    catalog: Arc<dyn ProductCatalog>,
    transactions: Arc<dyn TransactionStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CreateIntentHandler {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        transactions: Arc<dyn TransactionStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            catalog,
            transactions,
            gateway,
        }
    }

    pub async fn handle(
        &self,
        command: CreateIntentCommand,
    ) -> Result<CreateIntentResult, DomainError> {
        // 1. Resolve and validate the catalog selection.
        let product = self
            .catalog
            .find_product(&command.product_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ProductNotFound,
                    format!("Product {} not found", command.product_id),
                )
            })?;
        if !product.is_purchasable() {
            return Err(DomainError::new(
                ErrorCode::ProductNotActive,
                format!("Product '{}' is not open for purchase", product.name),
            ));
        }

        let package = self
            .catalog
            .find_package(&command.package_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PackageNotFound,
                    format!("Package {} not found", command.package_id),
                )
            })?;
        if !package.is_active {
            return Err(DomainError::new(
                ErrorCode::PackageNotActive,
                format!("Package '{}' is not currently sold", package.name),
            ));
        }
        if !package.belongs_to(&product.id) {
            return Err(DomainError::new(
                ErrorCode::PackageProductMismatch,
                format!(
                    "Package '{}' does not belong to product '{}'",
                    package.name, product.name
                ),
            )
            .with_detail("product_id", product.id.to_string())
            .with_detail("package_id", package.id.to_string()));
        }

        // 2. A repeated open with the same key reuses the pending row.
        if let Some(key) = &command.idempotency_key {
            if let Some(existing) = self.transactions.find_by_idempotency_key(key).await? {
                return self.reopen(existing).await;
            }
        }

        // 3. Create the gateway intent first; the ledger row references it.
        let metadata = json!({
            "customer_email": command.customer_email.as_str(),
            "product_id": product.id.to_string(),
            "package_id": package.id.to_string(),
            "product_name": product.name,
            "package_name": package.name,
            "credits": package.credits,
            "quantity": 1,
        });
        let intent = self
            .gateway
            .create_intent(CreateIntentRequest {
                amount: package.price,
                currency: CURRENCY.to_string(),
                customer_email: command.customer_email.clone(),
                metadata: metadata.clone(),
                idempotency_key: command.idempotency_key.clone(),
            })
            .await?;

        // 4. Open the pending ledger row keyed by the intent.
        let transaction = Transaction::open_pending(PurchaseSpec {
            amount: package.price,
            credits: package.credits,
            customer_email: command.customer_email,
            product_id: product.id,
            distributor_id: None,
            external_payment_ref: Some(intent.id.clone()),
            idempotency_key: command.idempotency_key.clone(),
            metadata,
        });
        if let Err(err) = self.transactions.insert(&transaction).await {
            // Lost an open race on the idempotency key; hand back the
            // winner's intent instead of failing the client.
            if err.code == ErrorCode::ValidationFailed {
                if let Some(key) = &command.idempotency_key {
                    if let Some(existing) = self.transactions.find_by_idempotency_key(key).await? {
                        warn!(
                            intent_id = %intent.id,
                            "concurrent open won the idempotency key, reusing its intent"
                        );
                        return self.reopen(existing).await;
                    }
                }
            }
            return Err(err);
        }

        info!(
            transaction_id = %transaction.id,
            intent_id = %intent.id,
            amount = %package.price,
            credits = package.credits,
            "payment intent created"
        );
        Ok(CreateIntentResult {
            client_secret: intent.client_secret,
            intent_id: intent.id,
            amount: package.price,
            currency: intent.currency,
            transaction_id: transaction.id,
        })
    }

    /// Hands an already-open purchase back to a retrying client.
    async fn reopen(&self, existing: Transaction) -> Result<CreateIntentResult, DomainError> {
        if existing.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "Idempotency key was already used by a settled purchase",
            )
            .with_detail("transaction_id", existing.id.to_string()));
        }
        let Some(intent_id) = existing.external_payment_ref.clone() else {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Pending transaction has no payment intent reference",
            ));
        };
        let intent = self.gateway.get_intent(&intent_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::PaymentFailed,
                "Payment intent no longer exists at the gateway",
            )
        })?;

        info!(
            transaction_id = %existing.id,
            intent_id = %intent.id,
            "reusing pending transaction for repeated open"
        );
        Ok(CreateIntentResult {
            client_secret: intent.client_secret,
            intent_id: intent.id,
            amount: existing.amount,
            currency: intent.currency,
            transaction_id: existing.id,
        })
    }
}
