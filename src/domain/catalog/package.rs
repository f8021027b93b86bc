//! Credit package entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, PackageId, ProductId, Timestamp};

/// A purchasable bundle of credits for one product.
///
/// # Invariants
///
/// - `credits` is positive
/// - `price` is positive
/// - Belongs to exactly one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPackage {
    /// Unique identifier for this package.
    pub id: PackageId,

    /// Product this package belongs to.
    pub product_id: ProductId,

    /// Display name, e.g. "Starter Pack".
    pub name: String,

    /// Credits granted per purchased code.
    pub credits: i32,

    /// Retail price in major currency units.
    pub price: Decimal,

    /// Whether the package is currently offered.
    pub is_active: bool,

    /// When the package was created.
    pub created_at: Timestamp,
}

impl CreditPackage {
    /// Creates a new package, validating its invariants.
    pub fn new(
        id: PackageId,
        product_id: ProductId,
        name: impl Into<String>,
        credits: i32,
        price: Decimal,
        is_active: bool,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation(
                "name",
                "Package name cannot be empty",
            ));
        }
        if credits <= 0 {
            return Err(DomainError::validation(
                "credits",
                format!("Credits must be positive, got {}", credits),
            ));
        }
        if price <= Decimal::ZERO {
            return Err(DomainError::validation(
                "price",
                format!("Price must be positive, got {}", price),
            ));
        }
        Ok(Self {
            id,
            product_id,
            name,
            credits,
            price,
            is_active,
            created_at: Timestamp::now(),
        })
    }

    /// Whether this package belongs to the given product.
    pub fn belongs_to(&self, product_id: &ProductId) -> bool {
        &self.product_id == product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn package(credits: i32, price_text: &str) -> Result<CreditPackage, DomainError> {
        CreditPackage::new(
            PackageId::new(),
            ProductId::new(),
            "Starter Pack",
            credits,
            price(price_text),
            true,
        )
    }

    #[test]
    fn new_package_accepts_valid_values() {
        let package = package(100, "10.00").unwrap();
        assert_eq!(package.credits, 100);
        assert_eq!(package.price, price("10.00"));
        assert_eq!(package.name, "Starter Pack");
    }

    #[test]
    fn new_package_rejects_empty_name() {
        let result = CreditPackage::new(
            PackageId::new(),
            ProductId::new(),
            "   ",
            100,
            price("10.00"),
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_package_rejects_non_positive_credits() {
        assert!(package(0, "10.00").is_err());
        assert!(package(-5, "10.00").is_err());
    }

    #[test]
    fn new_package_rejects_non_positive_price() {
        assert!(package(10, "0").is_err());
        assert!(package(10, "-1.50").is_err());
    }

    #[test]
    fn belongs_to_matches_owning_product() {
        let product_id = ProductId::new();
        let package =
            CreditPackage::new(PackageId::new(), product_id, "Pro", 50, price("5.00"), true)
                .unwrap();
        assert!(package.belongs_to(&product_id));
        assert!(!package.belongs_to(&ProductId::new()));
    }
}
