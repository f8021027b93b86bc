//! Product entity.
//!
//! A product is something credits can be spent on. Each product publishes a
//! map of action names to credit costs; purchases and codes are always
//! denominated against one product.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ProductId, Timestamp, ValidationError};

/// Product availability status.
///
/// Only `Active` products can be purchased or have codes minted against
/// them. `ComingSoon` products are listed but not purchasable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    ComingSoon,
    Inactive,
}

impl ProductStatus {
    /// Stable string form used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::ComingSoon => "coming_soon",
            ProductStatus::Inactive => "inactive",
        }
    }

    /// Parses the storage string form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "coming_soon" => Ok(ProductStatus::ComingSoon),
            "inactive" => Ok(ProductStatus::Inactive),
            other => Err(ValidationError::invalid_format(
                "product_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// Product entity.
///
/// # Invariants
///
/// - `name` is non-empty
/// - `credit_costs` values are positive
/// - Immutable after creation except status and cost edits by an
///   administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier for this product.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Optional marketing description.
    pub description: Option<String>,

    /// Action name to credit cost (e.g. "analysis" -> 5).
    pub credit_costs: HashMap<String, i32>,

    /// Availability status.
    pub status: ProductStatus,

    /// When the product was created.
    pub created_at: Timestamp,
}

impl Product {
    /// Creates a new product, validating its invariants.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: Option<String>,
        credit_costs: HashMap<String, i32>,
        status: ProductStatus,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        if let Some((action, cost)) = credit_costs.iter().find(|(_, cost)| **cost <= 0) {
            return Err(DomainError::validation(
                "credit_costs",
                format!("Cost for action '{}' must be positive, got {}", action, cost),
            ));
        }
        Ok(Self {
            id,
            name,
            description,
            credit_costs,
            status,
            created_at: Timestamp::now(),
        })
    }

    /// Whether purchases and code minting are allowed for this product.
    pub fn is_purchasable(&self) -> bool {
        self.status == ProductStatus::Active
    }
}
