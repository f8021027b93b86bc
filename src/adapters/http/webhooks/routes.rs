//! Route definitions for payment gateway webhooks.

use axum::routing::post;
use axum::Router;

use super::handlers::{handle_stripe_webhook, WebhookAppState};

/// Webhook routes for payment gateway events.
///
/// Kept separate from the customer-facing API surface so deployments can
/// mount it behind a distinct path or network policy.
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/webhooks/stripe", post(handle_stripe_webhook))
}
