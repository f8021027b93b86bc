//! Credit code store port.
//!
//! Defines the contract for persisting credit codes and for the two
//! conditional writes the domain leans on:
//!
//! - **Insert-if-absent**: code uniqueness is enforced by a database
//!   constraint, so generation can race freely and retry on collision.
//! - **Redeem-if-unredeemed**: a single conditional update is the only
//!   mutation path for redemption state. Whoever's update sticks wins;
//!   everyone else observes `AlreadyRedeemed`.
//!
//! No external locks, no read-modify-write.

use async_trait::async_trait;

use crate::domain::codes::{CreditCode, RedemptionCode};
use crate::domain::foundation::{DomainError, EmailAddress, Timestamp, TransactionId};

/// Result of attempting to insert a freshly generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The code text was free and the row was inserted.
    Inserted,
    /// Another code with the same text already exists; generate again.
    DuplicateCode,
}

/// Result of the conditional redemption update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// This caller won; carries the row as updated.
    Redeemed(CreditCode),
    /// The row was already redeemed when the update ran.
    AlreadyRedeemed,
}

/// Port for credit code persistence.
///
/// Implementations must back `insert_if_absent` with a unique constraint
/// on the code text and `redeem` with a single conditional update
/// (`... WHERE code = $1 AND is_redeemed = FALSE`).
#[async_trait]
pub trait CreditCodeStore: Send + Sync {
    /// Insert a code unless its text is already taken.
    ///
    /// Returns `DuplicateCode` instead of an error on collision so the
    /// generator can retry with fresh text.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert_if_absent(&self, code: &CreditCode) -> Result<InsertOutcome, DomainError>;

    /// Find a code by its text.
    ///
    /// Returns `None` if no such code exists.
    async fn find_by_code(
        &self,
        code: &RedemptionCode,
    ) -> Result<Option<CreditCode>, DomainError>;

    /// Atomically mark a code redeemed if it is not redeemed yet.
    ///
    /// The conditional update is the serialization point for concurrent
    /// redemption attempts. Losers get `AlreadyRedeemed` and should
    /// re-read the row to learn the winning `redeemed_at`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no such code exists
    /// - `DatabaseError` on persistence failure
    async fn redeem(
        &self,
        code: &RedemptionCode,
        redeemed_by: &EmailAddress,
        redeemed_at: Timestamp,
    ) -> Result<RedeemOutcome, DomainError>;

    /// All codes issued for a settled purchase.
    ///
    /// Used when a purchase is confirmed a second time: the stored codes
    /// are returned instead of minting new ones.
    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<CreditCode>, DomainError>;
}
