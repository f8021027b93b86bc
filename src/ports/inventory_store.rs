//! Distributor inventory port.
//!
//! Tracks how many credits each distributor holds per product. Batch code
//! generation credits the distributor's inventory; the row-level
//! `credits >= 0` check constraint keeps balances from going negative.

use async_trait::async_trait;

use crate::domain::foundation::{DistributorId, DomainError, ProductId};

/// Port for distributor inventory balances.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Add credits to a distributor's balance for one product.
    ///
    /// Creates the balance row if it does not exist yet (upsert).
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn add_credits(
        &self,
        distributor_id: &DistributorId,
        product_id: &ProductId,
        credits: i64,
    ) -> Result<(), DomainError>;

    /// Current balance for a distributor and product.
    ///
    /// Returns 0 if no balance row exists.
    async fn balance(
        &self,
        distributor_id: &DistributorId,
        product_id: &ProductId,
    ) -> Result<i64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn inventory_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn InventoryStore) {}
    }
}
