//! ListProductsHandler - Query handler for the storefront catalog.

use std::sync::Arc;

use crate::domain::catalog::{CreditPackage, Product};
use crate::domain::foundation::DomainError;
use crate::ports::ProductCatalog;

/// Query to list the purchasable catalog.
#[derive(Debug, Clone)]
pub struct ListProductsQuery;

/// One product with its active credit packages.
#[derive(Debug, Clone)]
pub struct ProductWithPackages {
    pub product: Product,
    pub packages: Vec<CreditPackage>,
}

/// Handler for listing active products and their packages.
pub struct ListProductsHandler {
    catalog: Arc<dyn ProductCatalog>,
}

impl ListProductsHandler {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(
        &self,
        _query: ListProductsQuery,
    ) -> Result<Vec<ProductWithPackages>, DomainError> {
        let products = self.catalog.list_active_products().await?;

        let mut listing = Vec::with_capacity(products.len());
        for product in products {
            let packages = self.catalog.list_active_packages(&product.id).await?;
            listing.push(ProductWithPackages { product, packages });
        }

        Ok(listing)
    }
}
