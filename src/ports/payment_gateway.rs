//! Payment gateway port for external payment processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//! The shop sells one-time credit purchases, so the surface is payment
//! intents rather than subscriptions: create an intent, read it back at
//! confirmation time, and verify webhook deliveries.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any card processor
//! - **Server-side pricing**: The request amount always comes from the
//!   catalog, never from client input
//! - **Idempotent**: Intent creation accepts an idempotency key so
//!   client retries cannot double-charge

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, EmailAddress};
use crate::domain::payments::GatewayEvent;

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for a credit purchase.
    ///
    /// Returns the gateway's intent, including the client secret the
    /// frontend needs to collect payment.
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetch an intent by the gateway's intent ID.
    ///
    /// Returns `None` if the gateway does not know the ID.
    async fn get_intent(&self, intent_id: &str) -> Result<Option<PaymentIntent>, GatewayError>;

    /// Verify a webhook delivery and parse it into a gateway event.
    ///
    /// Returns the parsed event if the signature is valid and fresh.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError>;
}

/// Request to create a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Charge amount in major currency units (e.g. 29.99).
    pub amount: Decimal,

    /// ISO currency code, lowercase ("usd").
    pub currency: String,

    /// Buyer's email, used for the receipt.
    pub customer_email: EmailAddress,

    /// Free-form metadata attached to the intent (product, package, credits).
    pub metadata: serde_json::Value,

    /// Idempotency key forwarded to the gateway for safe retries.
    pub idempotency_key: Option<String>,
}

/// Payment intent as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway's intent ID (`pi_...`).
    pub id: String,

    /// Secret the frontend uses to complete the payment.
    ///
    /// Absent when reading an intent back after creation.
    pub client_secret: Option<String>,

    /// Current intent status.
    pub status: PaymentIntentStatus,

    /// Amount in minor units (cents).
    pub amount_minor: i64,

    /// ISO currency code, lowercase.
    pub currency: String,
}

impl PaymentIntent {
    /// Amount in major currency units.
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.amount_minor, 2)
    }
}

/// Intent status from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    /// Funds captured; the purchase is paid.
    Succeeded,

    /// Payment is being processed asynchronously.
    Processing,

    /// Awaiting a payment method from the customer.
    RequiresPaymentMethod,

    /// Awaiting confirmation from the customer.
    RequiresConfirmation,

    /// Awaiting a customer action (e.g. 3-D Secure).
    RequiresAction,

    /// Authorized, awaiting capture.
    RequiresCapture,

    /// Intent was canceled.
    Canceled,

    /// Status this integration does not recognize.
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    /// Whether the payment has actually settled.
    ///
    /// Only `Succeeded` counts; everything else must not release codes.
    pub fn has_settled(&self) -> bool {
        matches!(self, PaymentIntentStatus::Succeeded)
    }
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Gateway's own error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Attach the gateway's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    /// Create a card declined error.
    pub fn declined(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::CardDeclined, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidWebhook, message)
    }

    /// Create a provider-side error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        use crate::domain::foundation::ErrorCode;

        let code = match err.code {
            GatewayErrorCode::CardDeclined
            | GatewayErrorCode::InvalidRequest
            | GatewayErrorCode::NotFound => ErrorCode::PaymentFailed,
            GatewayErrorCode::InvalidWebhook => ErrorCode::SignatureInvalid,
            _ => ErrorCode::GatewayUnavailable,
        };

        DomainError::new(code, err.message)
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Card was declined.
    CardDeclined,

    /// Request rejected by the gateway.
    InvalidRequest,

    /// Resource not found at the gateway.
    NotFound,

    /// Rate limit exceeded.
    RateLimited,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Gateway-side error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::RateLimited
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::CardDeclined => "card_declined",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimited => "rate_limited",
            GatewayErrorCode::InvalidWebhook => "invalid_webhook",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
