//! In-memory product catalog for testing.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::catalog::{CreditPackage, Product, ProductStatus};
use crate::domain::foundation::{DomainError, PackageId, ProductId};
use crate::ports::ProductCatalog;

/// In-memory catalog for tests and local development.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryProductCatalog {
    products: RwLock<Vec<Product>>,
    packages: RwLock<Vec<CreditPackage>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            products: RwLock::new(Vec::new()),
            packages: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Adds a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.products
            .write()
            .expect("InMemoryProductCatalog: products lock poisoned")
            .push(product);
    }

    /// Adds a credit package to the catalog.
    pub fn add_package(&self, package: CreditPackage) {
        self.packages
            .write()
            .expect("InMemoryProductCatalog: packages lock poisoned")
            .push(package);
    }
}

impl Default for InMemoryProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn list_active_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .expect("InMemoryProductCatalog: products lock poisoned")
            .iter()
            .filter(|p| p.status == ProductStatus::Active)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self
            .products
            .read()
            .expect("InMemoryProductCatalog: products lock poisoned")
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn find_package(&self, id: &PackageId) -> Result<Option<CreditPackage>, DomainError> {
        Ok(self
            .packages
            .read()
            .expect("InMemoryProductCatalog: packages lock poisoned")
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn list_active_packages(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<CreditPackage>, DomainError> {
        let mut packages: Vec<CreditPackage> = self
            .packages
            .read()
            .expect("InMemoryProductCatalog: packages lock poisoned")
            .iter()
            .filter(|p| &p.product_id == product_id && p.is_active)
            .cloned()
            .collect();
        packages.sort_by(|a, b| a.credits.cmp(&b.credits));
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn product(name: &str, status: ProductStatus) -> Product {
        Product::new(
            ProductId::new(),
            name,
            None,
            HashMap::from([("scan".to_string(), 5)]),
            status,
        )
        .unwrap()
    }

    fn package(product_id: ProductId, credits: i32, active: bool) -> CreditPackage {
        CreditPackage::new(
            PackageId::new(),
            product_id,
            format!("Pack {}", credits),
            credits,
            Decimal::from_str("19.99").unwrap(),
            active,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_active_products() {
        let catalog = InMemoryProductCatalog::new();
        catalog.add_product(product("Live", ProductStatus::Active));
        catalog.add_product(product("Teaser", ProductStatus::ComingSoon));
        catalog.add_product(product("Gone", ProductStatus::Inactive));

        let listed = catalog.list_active_products().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Live");
    }

    #[tokio::test]
    async fn lists_products_newest_first() {
        let catalog = InMemoryProductCatalog::new();
        let mut older = product("Older", ProductStatus::Active);
        older.created_at = older.created_at.minus_days(1);
        let newer = product("Newer", ProductStatus::Active);
        catalog.add_product(older);
        catalog.add_product(newer);

        let listed = catalog.list_active_products().await.unwrap();

        assert_eq!(listed[0].name, "Newer");
        assert_eq!(listed[1].name, "Older");
    }

    #[tokio::test]
    async fn finds_product_by_id() {
        let catalog = InMemoryProductCatalog::new();
        let wanted = product("Wanted", ProductStatus::Active);
        let wanted_id = wanted.id;
        catalog.add_product(wanted);
        catalog.add_product(product("Other", ProductStatus::Active));

        let found = catalog.find_product(&wanted_id).await.unwrap();

        assert_eq!(found.unwrap().name, "Wanted");
        assert!(catalog
            .find_product(&ProductId::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn active_packages_are_ordered_by_credits() {
        let catalog = InMemoryProductCatalog::new();
        let owner = product("Owner", ProductStatus::Active);
        let owner_id = owner.id;
        catalog.add_product(owner);
        catalog.add_package(package(owner_id, 500, true));
        catalog.add_package(package(owner_id, 50, true));
        catalog.add_package(package(owner_id, 100, false));
        catalog.add_package(package(ProductId::new(), 25, true));

        let packages = catalog.list_active_packages(&owner_id).await.unwrap();

        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].credits, 50);
        assert_eq!(packages[1].credits, 500);
    }
}
