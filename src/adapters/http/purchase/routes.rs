//! Axum router configuration for purchase endpoints.

use axum::{routing::post, Router};

use super::handlers::{confirm_payment, create_payment_intent, PurchaseAppState};

/// Create the purchase API router.
///
/// # Routes
/// - `POST /create-payment-intent` - Open a pending purchase and intent
/// - `POST /confirm-payment` - Settle the purchase and receive codes
pub fn purchase_routes() -> Router<PurchaseAppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/confirm-payment", post(confirm_payment))
}
