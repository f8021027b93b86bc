//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Stripe integration, including:
//! - Payment intent creation and retrieval
//! - Webhook signature verification
//! - A configurable mock for tests
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! Required environment variables:
//! - `STRIPE_API_KEY`: Stripe secret API key
//! - `STRIPE_WEBHOOK_SECRET`: Webhook signing secret (whsec_...)

mod mock_gateway;
mod stripe_gateway;
mod wire_types;

pub use mock_gateway::MockGateway;
pub use stripe_gateway::{StripeConfig, StripeGateway};
pub use wire_types::{StripeApiError, StripeErrorBody, StripeIntentObject};
