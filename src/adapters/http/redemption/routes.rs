//! Axum router configuration for redemption endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{redeem_code, validate_code, RedemptionAppState};

/// Create the redemption API router.
///
/// # Routes
/// - `POST /redeem-code` - Redeem a code for its credits
/// - `GET /validate-code/:code` - Read-only pre-flight check
pub fn redemption_routes() -> Router<RedemptionAppState> {
    Router::new()
        .route("/redeem-code", post(redeem_code))
        .route("/validate-code/:code", get(validate_code))
}
