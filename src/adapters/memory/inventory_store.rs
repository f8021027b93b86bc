//! In-memory distributor inventory for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{DistributorId, DomainError, ProductId};
use crate::ports::InventoryStore;

/// In-memory inventory balances for tests and local development.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryInventoryStore {
    balances: RwLock<HashMap<(DistributorId, ProductId), i64>>,
}

impl InMemoryInventoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryInventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn add_credits(
        &self,
        distributor_id: &DistributorId,
        product_id: &ProductId,
        credits: i64,
    ) -> Result<(), DomainError> {
        let mut balances = self
            .balances
            .write()
            .expect("InMemoryInventoryStore: balances lock poisoned");
        *balances.entry((*distributor_id, *product_id)).or_insert(0) += credits;
        Ok(())
    }

    async fn balance(
        &self,
        distributor_id: &DistributorId,
        product_id: &ProductId,
    ) -> Result<i64, DomainError> {
        Ok(self
            .balances
            .read()
            .expect("InMemoryInventoryStore: balances lock poisoned")
            .get(&(*distributor_id, *product_id))
            .copied()
            .unwrap_or(0))
    }
}
