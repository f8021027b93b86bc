//! ConfirmPurchaseHandler - Synchronous settlement after client-side payment.
//!
//! The client calls this once the gateway reports the payment succeeded.
//! The webhook reconciler makes the same pending→completed transition from
//! the other side, so this handler must tolerate arriving second: it then
//! returns the already-issued codes instead of minting again.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::codes::CreditCode;
use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, Timestamp, TransactionId};
use crate::domain::ledger::{Transaction, TransactionStatus, TransitionOutcome};
use crate::ports::{
    CreditCodeStore, NotificationSink, PaymentGateway, PurchaseReceipt, TransactionStore,
};

use super::issue_codes::{IssueCodesCommand, IssueCodesHandler};

/// Command to confirm a purchase whose payment the client collected.
#[derive(Debug, Clone)]
pub struct ConfirmPurchaseCommand {
    /// Gateway intent id handed out at open time.
    pub intent_id: String,

    /// Buyer email as the client sees it; only used for mismatch logging.
    pub customer_email: Option<EmailAddress>,
}

/// Result of a confirmed purchase.
#[derive(Debug, Clone)]
pub struct ConfirmPurchaseResult {
    pub transaction_id: TransactionId,

    /// Credits across all issued codes.
    pub credits_purchased: i64,

    /// The codes this purchase bought, fresh or previously issued.
    pub codes: Vec<CreditCode>,

    /// True when the webhook (or an earlier confirm) settled the row first.
    pub was_already_completed: bool,
}

/// Handler for the synchronous purchase completion path.
pub struct ConfirmPurchaseHandler {
    gateway: Arc<dyn PaymentGateway>,
    transactions: Arc<dyn TransactionStore>,
    codes: Arc<dyn CreditCodeStore>,
    issuance: Arc<IssueCodesHandler>,
    notifications: Arc<dyn NotificationSink>,
}

impl ConfirmPurchaseHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        transactions: Arc<dyn TransactionStore>,
        codes: Arc<dyn CreditCodeStore>,
        issuance: Arc<IssueCodesHandler>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            gateway,
            transactions,
            codes,
            issuance,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        command: ConfirmPurchaseCommand,
    ) -> Result<ConfirmPurchaseResult, DomainError> {
        // 1. The gateway is the authority on whether money moved.
        let intent = self
            .gateway
            .get_intent(&command.intent_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::PaymentFailed,
                    "Payment intent not found at the gateway",
                )
                .with_detail("intent_id", command.intent_id.clone())
            })?;
        if !intent.status.has_settled() {
            return Err(DomainError::new(
                ErrorCode::PaymentNotSettled,
                "Payment has not settled yet",
            )
            .with_detail("intent_id", intent.id.clone())
            .with_detail("status", format!("{:?}", intent.status)));
        }

        // 2. Find the ledger row opened for this intent.
        let transaction = self
            .transactions
            .find_by_external_ref(&command.intent_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::TransactionNotFound,
                    "No transaction found for this payment",
                )
                .with_detail("intent_id", command.intent_id.clone())
            })?;
        if let Some(claimed) = &command.customer_email {
            if claimed != &transaction.customer_email {
                warn!(
                    transaction_id = %transaction.id,
                    "confirm request email does not match the transaction's buyer"
                );
            }
        }

        // 3. Race the webhook for the pending→completed edge.
        let outcome = self
            .transactions
            .complete_if_pending(&transaction.id, Timestamp::now())
            .await?;

        match outcome {
            TransitionOutcome::Applied(tx) => self.complete_as_winner(tx).await,
            TransitionOutcome::AlreadySettled(tx) => self.complete_as_loser(tx).await,
        }
    }

    /// This call won the transition: mint the codes and send the receipt.
    ///
    /// Runs on a spawned task so a client disconnect mid-request cannot
    /// cancel issuance after the ledger already says completed.
    async fn complete_as_winner(
        &self,
        transaction: Transaction,
    ) -> Result<ConfirmPurchaseResult, DomainError> {
        let issuance = Arc::clone(&self.issuance);
        let notifications = Arc::clone(&self.notifications);
        let task_tx = transaction.clone();
        let continuation = tokio::spawn(async move {
            let issued = issuance
                .handle(IssueCodesCommand {
                    transaction: task_tx.clone(),
                })
                .await?;
            let codes = issued.into_codes();

            let receipt = PurchaseReceipt {
                customer_email: task_tx.customer_email.clone(),
                transaction_id: task_tx.id,
                total_credits: i64::from(task_tx.credits) * codes.len() as i64,
                codes: codes.iter().map(|c| c.code.clone()).collect(),
            };
            if let Err(err) = notifications.purchase_confirmation(&receipt).await {
                warn!(
                    transaction_id = %task_tx.id,
                    error = %err,
                    "purchase confirmation delivery failed"
                );
            }
            Ok::<Vec<CreditCode>, DomainError>(codes)
        });
        let codes = continuation.await.map_err(|err| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Issuance task failed: {err}"),
            )
        })??;

        info!(
            transaction_id = %transaction.id,
            codes = codes.len(),
            "purchase confirmed and codes issued"
        );
        Ok(ConfirmPurchaseResult {
            transaction_id: transaction.id,
            credits_purchased: i64::from(transaction.credits) * codes.len() as i64,
            codes,
            was_already_completed: false,
        })
    }

    /// The row was already terminal: return the winner's codes.
    async fn complete_as_loser(
        &self,
        transaction: Transaction,
    ) -> Result<ConfirmPurchaseResult, DomainError> {
        if transaction.status == TransactionStatus::Failed {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Transaction was already marked failed",
            )
            .with_detail("transaction_id", transaction.id.to_string()));
        }

        let codes = self.codes.find_by_transaction(&transaction.id).await?;
        info!(
            transaction_id = %transaction.id,
            codes = codes.len(),
            "purchase was already completed, returning existing codes"
        );
        Ok(ConfirmPurchaseResult {
            transaction_id: transaction.id,
            credits_purchased: i64::from(transaction.credits) * codes.len() as i64,
            codes,
            was_already_completed: true,
        })
    }
}
