//! Payment processor webhook event types.
//!
//! Defines the structures for parsing processor webhook payloads.
//! Only fields relevant to reconciliation are captured.

use serde::{Deserialize, Serialize};

use super::webhook_errors::WebhookError;

/// Processor webhook event (simplified).
///
/// Contains the essential fields needed for reconciliation.
/// Additional fields from the processor's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: GatewayEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,

    /// API version used to render this event.
    pub api_version: String,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl GatewayEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Returns true if this is a test mode event.
    pub fn is_test(&self) -> bool {
        !self.livemode
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> GatewayEventType {
        GatewayEventType::from_str(&self.event_type)
    }

    /// Extracts the payment intent view for `payment_intent.*` events.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the object has no `id`, `ParseError`
    /// when the object does not deserialize as an intent.
    pub fn intent_object(&self) -> Result<IntentObject, WebhookError> {
        if self.data.object.get("id").and_then(|v| v.as_str()).is_none() {
            return Err(WebhookError::MissingField("data.object.id"));
        }
        self.deserialize_object()
            .map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Extracts the dispute view for `charge.dispute.created` events.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the object has no `id`, `ParseError`
    /// when the object does not deserialize as a dispute.
    pub fn dispute_object(&self) -> Result<DisputeObject, WebhookError> {
        if self.data.object.get("id").and_then(|v| v.as_str()).is_none() {
            return Err(WebhookError::MissingField("data.object.id"));
        }
        self.deserialize_object()
            .map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}

/// Payment intent payload carried by `payment_intent.*` events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntentObject {
    /// The processor's intent id (pi_xxx) - the external payment ref.
    pub id: String,

    /// Charge amount in minor currency units, when present.
    #[serde(default)]
    pub amount: Option<i64>,

    /// Failure detail attached to `payment_intent.payment_failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment_error: Option<serde_json::Value>,
}

impl IntentObject {
    /// Human-readable failure message, when the processor supplied one.
    pub fn failure_message(&self) -> Option<&str> {
        self.last_payment_error
            .as_ref()?
            .get("message")?
            .as_str()
    }
}

/// Dispute payload carried by `charge.dispute.created` events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisputeObject {
    /// The processor's dispute id (dp_xxx).
    pub id: String,

    /// The disputed charge id.
    pub charge: String,

    /// Disputed amount in minor currency units.
    pub amount: i64,

    /// Processor-reported dispute reason (e.g. "fraudulent").
    #[serde(default)]
    pub reason: Option<String>,

    /// Dispute lifecycle status at creation time.
    #[serde(default)]
    pub status: Option<String>,
}

/// Known processor event types that we handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventType {
    /// Payment intent settled successfully.
    PaymentIntentSucceeded,
    /// Payment intent failed.
    PaymentIntentFailed,
    /// A charge was disputed by the cardholder.
    ChargeDisputeCreated,
    /// Unknown or unhandled event type.
    Unknown,
}

impl GatewayEventType {
    /// Parse event type from string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            "charge.dispute.created" => Self::ChargeDisputeCreated,
            _ => Self::Unknown,
        }
    }

    /// Convert to the processor event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentFailed => "payment_intent.payment_failed",
            Self::ChargeDisputeCreated => "charge.dispute.created",
            Self::Unknown => "unknown",
        }
    }
}

/// Builder for creating test GatewayEvent instances.
#[cfg(test)]
pub struct GatewayEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    previous_attributes: Option<serde_json::Value>,
    livemode: bool,
    api_version: String,
}

#[cfg(test)]
impl Default for GatewayEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "payment_intent.succeeded".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            previous_attributes: None,
            livemode: false,
            api_version: "2023-10-16".to_string(),
        }
    }
}

#[cfg(test)]
impl GatewayEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.created = created;
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> GatewayEvent {
        GatewayEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: GatewayEventData {
                object: self.object,
                previous_attributes: self.previous_attributes,
            },
            livemode: self.livemode,
            api_version: self.api_version,
        }
    }
}
