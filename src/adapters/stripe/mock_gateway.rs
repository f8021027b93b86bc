//! Mock payment gateway for testing.
//!
//! Provides a configurable mock implementation of `PaymentGateway` for unit
//! and integration tests. Supports:
//! - Pre-configured responses
//! - Error injection
//! - Call tracking
//! - Webhook event simulation

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::payments::GatewayEvent;
use crate::ports::{
    CreateIntentRequest, GatewayError, PaymentGateway, PaymentIntent, PaymentIntentStatus,
};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockGateway::new();
///
/// // Configure responses
/// mock.set_intent(PaymentIntent { id: "pi_123".into(), ... });
///
/// // Inject errors
/// mock.set_error(GatewayError::declined("Test decline"));
///
/// // Use in tests
/// let result = mock.create_intent(request).await;
/// ```
#[derive(Default)]
pub struct MockGateway {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Created intents by ID.
    intents: HashMap<String, PaymentIntent>,

    /// Next intent to return from `create_intent`.
    next_intent: Option<PaymentIntent>,

    /// Next webhook event to return from verification.
    next_webhook_event: Option<GatewayEvent>,

    /// Error to return on next call.
    next_error: Option<GatewayError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, GatewayError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Webhook verification behavior.
    webhook_verify_mode: WebhookVerifyMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Accept any payload and parse it as an event.
    #[default]
    AcceptAll,

    /// Require specific signature (reserved for future use).
    #[allow(dead_code)]
    RequireSignature(String),

    /// Always fail verification.
    AlwaysFail,
}

impl MockGateway {
    /// Create a new mock gateway with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the intent to return on the next `create_intent` call.
    pub fn set_intent(&self, intent: PaymentIntent) {
        self.inner.lock().unwrap().next_intent = Some(intent);
    }

    /// Add an intent to the "database".
    pub fn add_intent(&self, intent: PaymentIntent) {
        let id = intent.id.clone();
        self.inner.lock().unwrap().intents.insert(id, intent);
    }

    /// Flip a stored intent to `Succeeded`, as if the customer paid.
    pub fn settle_intent(&self, intent_id: &str) {
        let mut state = self.inner.lock().unwrap();
        if let Some(intent) = state.intents.get_mut(intent_id) {
            intent.status = PaymentIntentStatus::Succeeded;
        }
    }

    /// Set the webhook event to return on verification.
    pub fn set_webhook_event(&self, event: GatewayEvent) {
        self.inner.lock().unwrap().next_webhook_event = Some(event);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: GatewayError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();

        // Check method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Check global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

impl Clone for MockGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        self.record_call(
            "create_intent",
            vec![
                request.customer_email.as_str().to_string(),
                request.amount.to_string(),
            ],
        );
        self.check_error("create_intent")?;

        let mut state = self.inner.lock().unwrap();

        let amount_minor = request
            .amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|minor| minor.round().to_i64())
            .unwrap_or(0);

        let intent = state.next_intent.take().unwrap_or_else(|| {
            let id = format!(
                "pi_mock_{}",
                uuid::Uuid::new_v4().to_string().split('-').next().unwrap()
            );
            PaymentIntent {
                client_secret: Some(format!("{}_secret_mock", id)),
                id,
                status: PaymentIntentStatus::RequiresPaymentMethod,
                amount_minor,
                currency: request.currency,
            }
        });

        // Store for later retrieval
        state.intents.insert(intent.id.clone(), intent.clone());

        Ok(intent)
    }

    async fn get_intent(&self, intent_id: &str) -> Result<Option<PaymentIntent>, GatewayError> {
        self.record_call("get_intent", vec![intent_id.to_string()]);
        self.check_error("get_intent")?;

        let state = self.inner.lock().unwrap();
        Ok(state.intents.get(intent_id).cloned())
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        self.record_call(
            "verify_webhook",
            vec![
                String::from_utf8_lossy(payload).chars().take(50).collect(),
                signature.chars().take(20).collect(),
            ],
        );
        self.check_error("verify_webhook")?;

        let state = self.inner.lock().unwrap();

        // Check verification mode
        match &state.webhook_verify_mode {
            WebhookVerifyMode::AcceptAll => {}
            WebhookVerifyMode::RequireSignature(required) => {
                if signature != required {
                    return Err(GatewayError::invalid_webhook("Invalid signature"));
                }
            }
            WebhookVerifyMode::AlwaysFail => {
                return Err(GatewayError::invalid_webhook("Verification disabled"));
            }
        }

        // Return configured event or parse from payload
        if let Some(event) = &state.next_webhook_event {
            return Ok(event.clone());
        }

        serde_json::from_slice(payload).map_err(|e| GatewayError::invalid_webhook(e.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockGateway {
    /// Create a mock pre-seeded with a settled intent.
    pub fn with_settled_intent(intent_id: &str, amount_minor: i64) -> Self {
        let mock = Self::new();

        mock.add_intent(PaymentIntent {
            id: intent_id.to_string(),
            client_secret: None,
            status: PaymentIntentStatus::Succeeded,
            amount_minor,
            currency: "usd".to_string(),
        });

        mock
    }

    /// Build a signed-looking `payment_intent.succeeded` event payload.
    pub fn succeeded_event_payload(intent_id: &str, amount_minor: i64) -> String {
        serde_json::json!({
            "id": format!("evt_{}", uuid::Uuid::new_v4().simple()),
            "type": "payment_intent.succeeded",
            "created": chrono::Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": intent_id,
                    "amount": amount_minor
                }
            },
            "livemode": false,
            "api_version": "2023-10-16"
        })
        .to_string()
    }

    /// Build a `payment_intent.payment_failed` event payload.
    pub fn failed_event_payload(intent_id: &str, message: &str) -> String {
        serde_json::json!({
            "id": format!("evt_{}", uuid::Uuid::new_v4().simple()),
            "type": "payment_intent.payment_failed",
            "created": chrono::Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": intent_id,
                    "last_payment_error": { "message": message }
                }
            },
            "livemode": false,
            "api_version": "2023-10-16"
        })
        .to_string()
    }

    /// Build a `charge.dispute.created` event payload.
    pub fn dispute_event_payload(charge_id: &str, amount_minor: i64) -> String {
        serde_json::json!({
            "id": format!("evt_{}", uuid::Uuid::new_v4().simple()),
            "type": "charge.dispute.created",
            "created": chrono::Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": format!("dp_{}", uuid::Uuid::new_v4().simple()),
                    "charge": charge_id,
                    "amount": amount_minor,
                    "reason": "fraudulent",
                    "status": "needs_response"
                }
            },
            "livemode": false,
            "api_version": "2023-10-16"
        })
        .to_string()
    }
}
