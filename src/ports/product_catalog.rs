//! Product catalog port (read side).
//!
//! Read-only access to products and their credit packages. The storefront
//! and the purchase flow both price everything from this catalog; client
//! input never carries an amount.

use async_trait::async_trait;

use crate::domain::catalog::{CreditPackage, Product};
use crate::domain::foundation::{DomainError, PackageId, ProductId};

/// Read port for products and packages.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All active products, newest first.
    async fn list_active_products(&self) -> Result<Vec<Product>, DomainError>;

    /// Find a product by ID.
    ///
    /// Returns `None` if not found.
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// Find a credit package by ID.
    ///
    /// Returns `None` if not found.
    async fn find_package(&self, id: &PackageId) -> Result<Option<CreditPackage>, DomainError>;

    /// Active packages for one product.
    async fn list_active_packages(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<CreditPackage>, DomainError>;
}
