//! Data transfer objects for catalog endpoints.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::application::handlers::catalog::ProductWithPackages;
use crate::domain::catalog::{CreditPackage, ProductStatus};
use crate::domain::foundation::{PackageId, ProductId};

/// One purchasable credit package.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageResponse {
    pub id: PackageId,
    pub name: String,
    pub credits: i32,
    pub price: Decimal,
}

impl From<CreditPackage> for PackageResponse {
    fn from(package: CreditPackage) -> Self {
        Self {
            id: package.id,
            name: package.name,
            credits: package.credits,
            price: package.price,
        }
    }
}

/// One listed product with its purchasable packages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credit_costs: HashMap<String, i32>,
    pub status: ProductStatus,
    pub packages: Vec<PackageResponse>,
}

impl From<ProductWithPackages> for ProductResponse {
    fn from(listing: ProductWithPackages) -> Self {
        Self {
            id: listing.product.id,
            name: listing.product.name,
            description: listing.product.description,
            credit_costs: listing.product.credit_costs,
            status: listing.product.status,
            packages: listing
                .packages
                .into_iter()
                .map(PackageResponse::from)
                .collect(),
        }
    }
}
