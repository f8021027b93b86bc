//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own directory with DTOs, handlers, and routes;
//! `api_router` composes them into the full API surface.

pub mod middleware;

mod response;

pub mod catalog;
pub mod codes;
pub mod purchase;
pub mod redemption;
pub mod webhooks;

// Re-export key types for convenience
pub use catalog::{catalog_routes, CatalogAppState};
pub use codes::{codes_routes, CodesAppState};
pub use purchase::{purchase_routes, PurchaseAppState};
pub use redemption::{redemption_routes, RedemptionAppState};
pub use webhooks::{webhook_routes, WebhookAppState};

use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::domain::foundation::Timestamp;

/// Composes every feature router under `/api`, plus the health probe.
pub fn api_router(
    catalog: CatalogAppState,
    purchase: PurchaseAppState,
    redemption: RedemptionAppState,
    codes: CodesAppState,
    webhooks: WebhookAppState,
) -> Router {
    let api = Router::new()
        .merge(catalog_routes().with_state(catalog))
        .merge(purchase_routes().with_state(purchase))
        .merge(redemption_routes().with_state(redemption))
        .merge(codes_routes().with_state(codes))
        .merge(webhook_routes().with_state(webhooks));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}

/// GET /health - Liveness probe.
async fn health() -> Response {
    response::success(json!({
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": Timestamp::now(),
    }))
}
