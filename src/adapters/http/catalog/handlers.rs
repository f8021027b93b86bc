//! HTTP handlers for the public catalog.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};

use super::super::response::{domain_failure, success};
use super::dto::ProductResponse;
use crate::application::handlers::catalog::{ListProductsHandler, ListProductsQuery};
use crate::domain::foundation::DomainError;
use crate::ports::ProductCatalog;

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for catalog endpoints.
#[derive(Clone)]
pub struct CatalogAppState {
    pub catalog: Arc<dyn ProductCatalog>,
}

impl CatalogAppState {
    pub fn list_products_handler(&self) -> ListProductsHandler {
        ListProductsHandler::new(Arc::clone(&self.catalog))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP Handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/products - List active products with their active packages.
pub async fn list_products(
    State(state): State<CatalogAppState>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let listing = state
        .list_products_handler()
        .handle(ListProductsQuery)
        .await?;

    let products: Vec<ProductResponse> =
        listing.into_iter().map(ProductResponse::from).collect();
    Ok(success(products))
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// Error wrapper translating catalog failures into the API envelope.
#[derive(Debug)]
pub struct CatalogApiError(DomainError);

impl From<DomainError> for CatalogApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        domain_failure(self.0)
    }
}
