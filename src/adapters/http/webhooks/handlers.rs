//! HTTP handler for payment gateway webhooks.
//!
//! Webhooks are verified against the raw request body, so this endpoint
//! reads `Bytes` instead of a JSON extractor; any re-serialization would
//! break the signature. The response status drives the gateway's retry
//! behavior: 2xx acknowledges, 4xx rejects for cause, 5xx asks for a
//! redelivery.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde_json::json;
use tracing::warn;

use super::super::response::{failure, success, ApiErrorBody};
use crate::application::handlers::purchase::IssueCodesHandler;
use crate::application::handlers::webhooks::{ProcessEventCommand, ProcessEventHandler};
use crate::domain::foundation::ErrorCode;
use crate::domain::payments::WebhookError;
use crate::ports::{
    AuditLog, CreditCodeStore, InventoryStore, PaymentGateway, ProcessedEventStore,
    TransactionStore,
};

/// Signature header attached to every gateway delivery.
const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for webhook endpoints.
#[derive(Clone)]
pub struct WebhookAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub transactions: Arc<dyn TransactionStore>,
    pub codes: Arc<dyn CreditCodeStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub processed_events: Arc<dyn ProcessedEventStore>,
    pub audit: Arc<dyn AuditLog>,
}

impl WebhookAppState {
    pub fn process_event_handler(&self) -> ProcessEventHandler {
        let issuance = Arc::new(IssueCodesHandler::new(
            Arc::clone(&self.codes),
            Arc::clone(&self.inventory),
            Arc::clone(&self.audit),
        ));
        ProcessEventHandler::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.transactions),
            Arc::clone(&self.processed_events),
            issuance,
            Arc::clone(&self.audit),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Receive a signed gateway event.
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("webhook delivery without signature header");
        return failure(
            StatusCode::BAD_REQUEST,
            ApiErrorBody::new(
                ErrorCode::SignatureInvalid,
                "Missing Stripe-Signature header",
            ),
        );
    };

    match state
        .process_event_handler()
        .handle(ProcessEventCommand {
            payload: body.to_vec(),
            signature: signature.to_string(),
        })
        .await
    {
        Ok(_) => success(json!({ "received": true })),
        Err(err) => webhook_failure(err),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

fn webhook_failure(err: WebhookError) -> Response {
    let code = match &err {
        // Deliberately ignored events are acknowledged as received
        WebhookError::Ignored(_) => {
            return success(json!({ "received": true }));
        }
        WebhookError::InvalidSignature
        | WebhookError::TimestampOutOfRange
        | WebhookError::InvalidTimestamp => ErrorCode::SignatureInvalid,
        WebhookError::ParseError(_) | WebhookError::MissingField(_) => ErrorCode::ValidationFailed,
        WebhookError::Database(_) => ErrorCode::InternalError,
    };
    let status = err.status_code();
    warn!(error = %err, status = %status, "webhook delivery rejected");

    let message = if status.is_server_error() {
        "An internal error occurred".to_string()
    } else {
        err.to_string()
    };
    failure(status, ApiErrorBody::new(code, message))
}
