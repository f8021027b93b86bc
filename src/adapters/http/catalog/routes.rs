//! Axum router configuration for catalog endpoints.

use axum::{routing::get, Router};

use super::handlers::{list_products, CatalogAppState};

/// Create the catalog API router.
///
/// # Routes
/// - `GET /products` - Active products with their active packages
pub fn catalog_routes() -> Router<CatalogAppState> {
    Router::new().route("/products", get(list_products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::memory::InMemoryProductCatalog;

    #[test]
    fn catalog_routes_creates_router() {
        let router = catalog_routes();
        let state = CatalogAppState {
            catalog: Arc::new(InMemoryProductCatalog::new()),
        };
        let _: Router<()> = router.with_state(state);
    }
}
