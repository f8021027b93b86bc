//! Payments domain module.
//!
//! Processor-facing webhook event model and signature verification.
//!
//! # Module Structure
//!
//! - `gateway_event` - Parsed webhook event and typed payload views
//! - `webhook_errors` - Verification and reconciliation error taxonomy
//! - `webhook_verifier` - HMAC-SHA256 signature verification

mod gateway_event;
mod webhook_errors;
mod webhook_verifier;

pub use gateway_event::{
    DisputeObject, GatewayEvent, GatewayEventData, GatewayEventType, IntentObject,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use gateway_event::GatewayEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
