//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the Stripe REST API.
//! Creates and retrieves payment intents and verifies webhook signatures.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let gateway = StripeGateway::new(config);
//! ```

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::payments::{GatewayEvent, WebhookVerifier};
use crate::ports::{
    CreateIntentRequest, GatewayError, GatewayErrorCode, PaymentGateway, PaymentIntent,
};

use super::wire_types::{StripeErrorBody, StripeIntentObject};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Whether to require livemode events in production.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `STRIPE_API_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `STRIPE_REQUIRE_LIVEMODE` (optional, defaults to false)
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_key = std::env::var("STRIPE_API_KEY")?;
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")?;
        let require_livemode = std::env::var("STRIPE_REQUIRE_LIVEMODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            api_key: SecretString::new(api_key),
            webhook_secret: SecretString::new(webhook_secret),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode,
        })
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment gateway adapter.
///
/// Implements `PaymentGateway` for Stripe API integration.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, GatewayError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        let params = intent_params(&request)?;

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params);

        // Stripe deduplicates retried creations by this header, not a form field
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "create_intent").await);
        }

        let wire: StripeIntentObject = response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        tracing::info!(intent_id = %wire.id, status = %wire.status, "Created payment intent");

        Ok(wire.into_intent())
    }

    async fn get_intent(&self, intent_id: &str) -> Result<Option<PaymentIntent>, GatewayError> {
        let url = format!(
            "{}/v1/payment_intents/{}",
            self.config.api_base_url, intent_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(error_from_response(response, "get_intent").await);
        }

        let wire: StripeIntentObject = response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(Some(wire.into_intent()))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        let verifier = WebhookVerifier::new(self.config.webhook_secret.expose_secret());

        let event = verifier.verify_and_parse(payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Webhook verification failed");
            GatewayError::invalid_webhook(e.to_string())
        })?;

        if self.config.require_livemode && !event.is_live() {
            tracing::warn!(
                event_id = %event.id,
                "Rejected test mode event in production"
            );
            return Err(GatewayError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}

/// Convert a major-unit amount to Stripe's minor units (cents).
fn amount_to_minor_units(amount: Decimal) -> Result<i64, GatewayError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.round().to_i64())
        .ok_or_else(|| {
            GatewayError::new(
                GatewayErrorCode::InvalidRequest,
                format!("Amount out of range: {}", amount),
            )
        })
}

/// Build the form-encoded body for a payment intent creation.
///
/// Metadata values are flattened into `metadata[key]` form fields; strings
/// pass through as-is, other JSON values are rendered via `to_string`.
fn intent_params(request: &CreateIntentRequest) -> Result<Vec<(String, String)>, GatewayError> {
    let amount_minor = amount_to_minor_units(request.amount)?;

    let mut params = vec![
        ("amount".to_string(), amount_minor.to_string()),
        ("currency".to_string(), request.currency.clone()),
        (
            "receipt_email".to_string(),
            request.customer_email.as_str().to_string(),
        ),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];

    if let Some(map) = request.metadata.as_object() {
        for (key, value) in map {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            params.push((format!("metadata[{}]", key), rendered));
        }
    }

    Ok(params)
}

/// Map a non-2xx Stripe response to a gateway error.
///
/// Attempts to parse the structured error body so card declines surface
/// with their decline code; falls back to the raw body text.
async fn error_from_response(response: reqwest::Response, operation: &str) -> GatewayError {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    tracing::error!(%status, operation, error = %error_text, "Stripe API call failed");

    match serde_json::from_str::<StripeErrorBody>(&error_text) {
        Ok(body) => body.error.into_gateway_error(),
        Err(_) => GatewayError::provider(format!("Stripe API error: {}", error_text)),
    }
}
