//! Payment gateway webhook endpoint.
//!
//! Receives signed event deliveries, verifies them against the raw body,
//! and reconciles transaction state through the application layer.

mod handlers;
mod routes;

pub use handlers::WebhookAppState;
pub use routes::webhook_routes;
