//! ProcessEventHandler - Gateway webhook reconciliation.
//!
//! Webhooks are the authoritative completion path: they arrive even when the
//! buyer's client dies mid-purchase. Every effect behind this handler is
//! individually idempotent (conditional ledger transitions, check-then-mint
//! issuance), so a redelivered event converges to the same state. The
//! processed-event journal on top short-circuits known deliveries; failed
//! attempts are left retryable so the gateway's redelivery does real work.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::ledger::{TransactionStatus, TransitionOutcome};
use crate::domain::payments::{GatewayEvent, GatewayEventType, WebhookError};
use crate::ports::{
    AuditEvent, AuditLog, GatewayErrorCode, PaymentGateway, ProcessedEvent, ProcessedEventStore,
    ProcessingStatus, SaveResult, TransactionStore,
};

use super::super::purchase::{IssueCodesCommand, IssueCodesHandler};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessEventCommand {
    /// Raw request body, byte-exact as received.
    pub payload: Vec<u8>,

    /// Signature header supplied by the gateway.
    pub signature: String,
}

/// What processing one delivery did.
#[derive(Debug, Clone)]
pub enum ProcessEventResult {
    /// A succeeded-intent event won the completion and issued codes.
    PurchaseCompleted {
        transaction_id: TransactionId,
        codes_issued: usize,
    },

    /// The transaction was already terminal; nothing changed.
    AlreadySettled { transaction_id: TransactionId },

    /// A failed-intent event marked the transaction failed.
    PurchaseFailed { transaction_id: TransactionId },

    /// A dispute was appended to the audit log.
    DisputeRecorded { dispute_id: String },

    /// The event was acknowledged but deliberately not acted on.
    Ignored { reason: String },

    /// The journal had already recorded this delivery.
    Duplicate,
}

/// Handler for incoming payment gateway webhooks.
pub struct ProcessEventHandler {
    gateway: Arc<dyn PaymentGateway>,
    transactions: Arc<dyn TransactionStore>,
    processed_events: Arc<dyn ProcessedEventStore>,
    issuance: Arc<IssueCodesHandler>,
    audit: Arc<dyn AuditLog>,
}

impl ProcessEventHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        transactions: Arc<dyn TransactionStore>,
        processed_events: Arc<dyn ProcessedEventStore>,
        issuance: Arc<IssueCodesHandler>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            gateway,
            transactions,
            processed_events,
            issuance,
            audit,
        }
    }

    pub async fn handle(
        &self,
        command: ProcessEventCommand,
    ) -> Result<ProcessEventResult, WebhookError> {
        // 1. Verify before trusting a single byte of the payload.
        let event = match self
            .gateway
            .verify_webhook(&command.payload, &command.signature)
            .await
        {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "webhook verification failed");
                return Err(match err.code {
                    GatewayErrorCode::InvalidWebhook => WebhookError::InvalidSignature,
                    _ => WebhookError::ParseError(err.message),
                });
            }
        };

        // 2. Short-circuit deliveries the journal already settled. Failed
        //    attempts stay retryable; their effects are idempotent.
        if let Some(prior) = self.processed_events.find_by_event_id(&event.id).await? {
            if prior.status != ProcessingStatus::Failed {
                info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "duplicate webhook delivery, skipping"
                );
                return Ok(ProcessEventResult::Duplicate);
            }
        }

        // 3. Dispatch on the event type.
        let outcome = match event.parsed_type() {
            GatewayEventType::PaymentIntentSucceeded => self.intent_succeeded(&event).await,
            GatewayEventType::PaymentIntentFailed => self.intent_failed(&event).await,
            GatewayEventType::ChargeDisputeCreated => self.dispute_created(&event).await,
            GatewayEventType::Unknown => {
                info!(event_type = %event.event_type, "unhandled webhook event type, ignoring");
                Ok(ProcessEventResult::Ignored {
                    reason: format!("unhandled event type '{}'", event.event_type),
                })
            }
        };

        // 4. Journal the terminal outcome. Best-effort: the journal is
        //    defense-in-depth, never the authority.
        self.journal(&event, &outcome).await;
        outcome
    }

    /// The purchase settled at the gateway; settle it here and issue codes.
    async fn intent_succeeded(
        &self,
        event: &GatewayEvent,
    ) -> Result<ProcessEventResult, WebhookError> {
        let intent = event.intent_object()?;

        let Some(transaction) = self.transactions.find_by_external_ref(&intent.id).await? else {
            info!(intent_id = %intent.id, "no transaction for succeeded intent, ignoring");
            return Ok(ProcessEventResult::Ignored {
                reason: format!("no transaction for intent '{}'", intent.id),
            });
        };

        match self
            .transactions
            .complete_if_pending(&transaction.id, Timestamp::now())
            .await?
        {
            TransitionOutcome::Applied(tx) => {
                info!(
                    transaction_id = %tx.id,
                    intent_id = %intent.id,
                    "webhook settled the purchase"
                );
                if tx.distributor_id.is_some() {
                    // Distributor codes come from the admin batch path.
                    return Ok(ProcessEventResult::PurchaseCompleted {
                        transaction_id: tx.id,
                        codes_issued: 0,
                    });
                }
                let issued = self
                    .issuance
                    .handle(IssueCodesCommand {
                        transaction: tx.clone(),
                    })
                    .await?;
                Ok(ProcessEventResult::PurchaseCompleted {
                    transaction_id: tx.id,
                    codes_issued: issued.codes().len(),
                })
            }
            TransitionOutcome::AlreadySettled(tx) => {
                info!(
                    transaction_id = %tx.id,
                    "transaction already settled when webhook arrived"
                );
                Ok(ProcessEventResult::AlreadySettled {
                    transaction_id: tx.id,
                })
            }
        }
    }

    /// The payment attempt failed; mark the transaction failed if still open.
    async fn intent_failed(
        &self,
        event: &GatewayEvent,
    ) -> Result<ProcessEventResult, WebhookError> {
        let intent = event.intent_object()?;
        if let Some(reason) = intent.failure_message() {
            warn!(intent_id = %intent.id, reason, "payment attempt failed");
        }

        let Some(transaction) = self.transactions.find_by_external_ref(&intent.id).await? else {
            info!(intent_id = %intent.id, "no transaction for failed intent, ignoring");
            return Ok(ProcessEventResult::Ignored {
                reason: format!("no transaction for intent '{}'", intent.id),
            });
        };

        match self
            .transactions
            .fail_if_pending(&transaction.id, Timestamp::now())
            .await?
        {
            TransitionOutcome::Applied(tx) => {
                info!(transaction_id = %tx.id, "transaction marked failed");
                Ok(ProcessEventResult::PurchaseFailed {
                    transaction_id: tx.id,
                })
            }
            TransitionOutcome::AlreadySettled(tx) => {
                if tx.status == TransactionStatus::Completed {
                    warn!(
                        transaction_id = %tx.id,
                        "failure event arrived after completion; row left completed"
                    );
                }
                Ok(ProcessEventResult::AlreadySettled {
                    transaction_id: tx.id,
                })
            }
        }
    }

    /// A charge was disputed; the audit trail is the record.
    async fn dispute_created(
        &self,
        event: &GatewayEvent,
    ) -> Result<ProcessEventResult, WebhookError> {
        let dispute = event.dispute_object()?;

        let audit_event = AuditEvent::new("payment_disputed", "transactions").with_detail(json!({
            "dispute_id": dispute.id,
            "charge_id": dispute.charge,
            "amount_minor": dispute.amount,
            "reason": dispute.reason,
            "status": dispute.status,
        }));
        self.audit.record(&audit_event).await?;

        warn!(
            dispute_id = %dispute.id,
            charge_id = %dispute.charge,
            "charge dispute opened"
        );
        Ok(ProcessEventResult::DisputeRecorded {
            dispute_id: dispute.id,
        })
    }

    /// Record the delivery's terminal outcome in the journal.
    async fn journal(
        &self,
        event: &GatewayEvent,
        outcome: &Result<ProcessEventResult, WebhookError>,
    ) {
        let payload = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
        let record = match outcome {
            Ok(ProcessEventResult::Ignored { reason }) => {
                ProcessedEvent::ignored(&event.id, &event.event_type, reason, payload)
            }
            Ok(_) => ProcessedEvent::success(&event.id, &event.event_type, payload),
            Err(err) => {
                ProcessedEvent::failed(&event.id, &event.event_type, err.to_string(), payload)
            }
        };
        match self.processed_events.save(record).await {
            Ok(SaveResult::Inserted) => {}
            Ok(SaveResult::AlreadyExists) => {
                debug!(event_id = %event.id, "processed-event record already present");
            }
            Err(err) => {
                warn!(
                    event_id = %event.id,
                    error = %err,
                    "failed to journal processed webhook event"
                );
            }
        }
    }
}
