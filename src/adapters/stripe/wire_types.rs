//! Stripe wire-format types.
//!
//! Response payloads from the Stripe REST API and their mapping into the
//! gateway port types. Only the fields this integration reads are declared;
//! everything else in the response body is ignored by serde.

use serde::Deserialize;

use crate::ports::{GatewayError, GatewayErrorCode, PaymentIntent, PaymentIntentStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Payment Intent
// ════════════════════════════════════════════════════════════════════════════════

/// PaymentIntent object as returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeIntentObject {
    /// Unique intent identifier (pi_...).
    pub id: String,

    /// Object type (always "payment_intent").
    #[serde(default)]
    pub object: String,

    /// Secret the frontend uses to complete the payment.
    ///
    /// Absent when retrieving an intent with a restricted key.
    pub client_secret: Option<String>,

    /// Intent lifecycle status.
    pub status: String,

    /// Amount in minor currency units.
    pub amount: i64,

    /// Lowercase ISO currency code.
    pub currency: String,

    /// Key-value metadata attached at creation.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl StripeIntentObject {
    /// Convert into the gateway port's intent view.
    pub fn into_intent(self) -> PaymentIntent {
        PaymentIntent {
            id: self.id,
            client_secret: self.client_secret,
            status: parse_intent_status(&self.status),
            amount_minor: self.amount,
            currency: self.currency,
        }
    }
}

/// Map a Stripe intent status string to the port status.
///
/// Unrecognized statuses map to `Unknown` rather than failing, so new
/// Stripe statuses do not break intent retrieval.
pub fn parse_intent_status(status: &str) -> PaymentIntentStatus {
    match status {
        "succeeded" => PaymentIntentStatus::Succeeded,
        "processing" => PaymentIntentStatus::Processing,
        "requires_payment_method" => PaymentIntentStatus::RequiresPaymentMethod,
        "requires_confirmation" => PaymentIntentStatus::RequiresConfirmation,
        "requires_action" => PaymentIntentStatus::RequiresAction,
        "requires_capture" => PaymentIntentStatus::RequiresCapture,
        "canceled" => PaymentIntentStatus::Canceled,
        _ => PaymentIntentStatus::Unknown,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    /// The error detail object.
    pub error: StripeApiError,
}

/// Error detail from a failed Stripe API call.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    /// Error category (e.g., "card_error", "invalid_request_error").
    #[serde(rename = "type")]
    pub error_type: String,

    /// Machine-readable error code (e.g., "card_declined").
    pub code: Option<String>,

    /// Human-readable message.
    pub message: Option<String>,

    /// Reason a card was declined, when applicable.
    pub decline_code: Option<String>,
}

impl StripeApiError {
    /// Convert into the gateway port's error type.
    ///
    /// Card errors keep the decline code as the provider code so callers
    /// can surface the decline reason to the customer.
    pub fn into_gateway_error(self) -> GatewayError {
        let message = self
            .message
            .unwrap_or_else(|| format!("Stripe {}", self.error_type));

        match self.error_type.as_str() {
            "card_error" => {
                let error = GatewayError::declined(message);
                match self.decline_code.or(self.code) {
                    Some(code) => error.with_provider_code(code),
                    None => error,
                }
            }
            "invalid_request_error" => GatewayError::new(GatewayErrorCode::InvalidRequest, message),
            "authentication_error" => GatewayError::authentication(message),
            "rate_limit_error" => GatewayError::new(GatewayErrorCode::RateLimited, message),
            _ => GatewayError::provider(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Intent Deserialization Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn deserialize_full_intent_object() {
        let json = r#"{
            "id": "pi_3MtwBwLkdIwHu7ix28a3tqPa",
            "object": "payment_intent",
            "client_secret": "pi_3MtwBwLkdIwHu7ix28a3tqPa_secret_YrKJUKribcBjcG8HVhfZluoGH",
            "status": "requires_payment_method",
            "amount": 2999,
            "currency": "usd",
            "metadata": {"transaction_id": "b7e23ec2"}
        }"#;

        let wire: StripeIntentObject = serde_json::from_str(json).unwrap();

        assert_eq!(wire.id, "pi_3MtwBwLkdIwHu7ix28a3tqPa");
        assert_eq!(wire.object, "payment_intent");
        assert!(wire.client_secret.is_some());
        assert_eq!(wire.amount, 2999);
        assert_eq!(wire.metadata["transaction_id"], "b7e23ec2");
    }

    #[test]
    fn deserialize_intent_ignores_unknown_fields() {
        let json = r#"{
            "id": "pi_minimal",
            "status": "succeeded",
            "amount": 500,
            "currency": "usd",
            "latest_charge": "ch_123",
            "payment_method_types": ["card"]
        }"#;

        let wire: StripeIntentObject = serde_json::from_str(json).unwrap();

        assert_eq!(wire.id, "pi_minimal");
        assert!(wire.client_secret.is_none());
        assert_eq!(wire.metadata, serde_json::Value::Null);
    }

    #[test]
    fn into_intent_maps_all_fields() {
        let wire = StripeIntentObject {
            id: "pi_convert".to_string(),
            object: "payment_intent".to_string(),
            client_secret: Some("pi_convert_secret_abc".to_string()),
            status: "succeeded".to_string(),
            amount: 4999,
            currency: "usd".to_string(),
            metadata: serde_json::json!({}),
        };

        let intent = wire.into_intent();

        assert_eq!(intent.id, "pi_convert");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_convert_secret_abc"));
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
        assert_eq!(intent.amount_minor, 4999);
        assert_eq!(intent.currency, "usd");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_status_known_values() {
        let cases = [
            ("succeeded", PaymentIntentStatus::Succeeded),
            ("processing", PaymentIntentStatus::Processing),
            ("requires_payment_method", PaymentIntentStatus::RequiresPaymentMethod),
            ("requires_confirmation", PaymentIntentStatus::RequiresConfirmation),
            ("requires_action", PaymentIntentStatus::RequiresAction),
            ("requires_capture", PaymentIntentStatus::RequiresCapture),
            ("canceled", PaymentIntentStatus::Canceled),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_intent_status(input), expected, "status: {}", input);
        }
    }

    #[test]
    fn parse_status_unknown_value() {
        assert_eq!(
            parse_intent_status("some_future_status"),
            PaymentIntentStatus::Unknown
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn card_error_maps_to_declined_with_decline_code() {
        let json = r#"{
            "error": {
                "type": "card_error",
                "code": "card_declined",
                "decline_code": "insufficient_funds",
                "message": "Your card has insufficient funds."
            }
        }"#;

        let body: StripeErrorBody = serde_json::from_str(json).unwrap();
        let error = body.error.into_gateway_error();

        assert_eq!(error.code, GatewayErrorCode::CardDeclined);
        assert_eq!(error.provider_code.as_deref(), Some("insufficient_funds"));
        assert_eq!(error.message, "Your card has insufficient funds.");
        assert!(!error.retryable);
    }

    #[test]
    fn card_error_falls_back_to_code_without_decline_code() {
        let api_error = StripeApiError {
            error_type: "card_error".to_string(),
            code: Some("expired_card".to_string()),
            message: Some("Your card has expired.".to_string()),
            decline_code: None,
        };

        let error = api_error.into_gateway_error();

        assert_eq!(error.code, GatewayErrorCode::CardDeclined);
        assert_eq!(error.provider_code.as_deref(), Some("expired_card"));
    }

    #[test]
    fn invalid_request_error_maps_to_invalid_request() {
        let api_error = StripeApiError {
            error_type: "invalid_request_error".to_string(),
            code: None,
            message: Some("Missing required param: amount.".to_string()),
            decline_code: None,
        };

        let error = api_error.into_gateway_error();

        assert_eq!(error.code, GatewayErrorCode::InvalidRequest);
        assert!(!error.retryable);
    }

    #[test]
    fn authentication_error_maps_to_authentication() {
        let api_error = StripeApiError {
            error_type: "authentication_error".to_string(),
            code: None,
            message: Some("Invalid API Key provided.".to_string()),
            decline_code: None,
        };

        let error = api_error.into_gateway_error();

        assert_eq!(error.code, GatewayErrorCode::AuthenticationError);
    }

    #[test]
    fn rate_limit_error_is_retryable() {
        let api_error = StripeApiError {
            error_type: "rate_limit_error".to_string(),
            code: None,
            message: None,
            decline_code: None,
        };

        let error = api_error.into_gateway_error();

        assert_eq!(error.code, GatewayErrorCode::RateLimited);
        assert!(error.retryable);
    }

    #[test]
    fn unknown_error_type_maps_to_provider() {
        let api_error = StripeApiError {
            error_type: "api_error".to_string(),
            code: None,
            message: Some("Something went wrong on Stripe's end.".to_string()),
            decline_code: None,
        };

        let error = api_error.into_gateway_error();

        assert_eq!(error.code, GatewayErrorCode::ProviderError);
    }

    #[test]
    fn missing_message_uses_error_type() {
        let api_error = StripeApiError {
            error_type: "card_error".to_string(),
            code: None,
            message: None,
            decline_code: None,
        };

        let error = api_error.into_gateway_error();

        assert_eq!(error.message, "Stripe card_error");
    }
}
