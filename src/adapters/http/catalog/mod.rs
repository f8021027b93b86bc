//! HTTP adapter for catalog endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{PackageResponse, ProductResponse};
pub use handlers::{list_products, CatalogApiError, CatalogAppState};
pub use routes::catalog_routes;
