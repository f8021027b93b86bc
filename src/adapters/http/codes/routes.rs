//! Axum router configuration for code administration endpoints.

use axum::{routing::post, Router};

use super::handlers::{generate_codes, CodesAppState};

/// Create the code administration router.
///
/// # Routes
/// - `POST /codes/generate` - Mint a code batch (capability-guarded)
pub fn codes_routes() -> Router<CodesAppState> {
    Router::new().route("/codes/generate", post(generate_codes))
}
