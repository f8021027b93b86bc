//! Credit code entity.
//!
//! A credit code is a prepaid grant of product credits, minted either when a
//! purchase settles or by an admin/distributor batch. It is redeemed at most
//! once; the winner of a concurrent redemption race is decided by the store's
//! conditional update, and this entity mirrors that rule in memory.
//!
//! # Design Decisions
//!
//! - **Code text is the lookup key**: `code` is unique at the database level;
//!   the row id exists only for foreign keys and audit records
//! - **Single redemption**: `is_redeemed` flips once, never back
//! - **Expiry beats redemption state**: an expired code fails `Expired` even
//!   if it was never redeemed
//! - **Provenance is optional**: purchase-issued codes carry a transaction and
//!   customer email; batch-issued codes carry a distributor instead

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    CreditCodeId, DistributorId, EmailAddress, ProductId, Timestamp, TransactionId,
    ValidationError,
};

use super::{RedemptionCode, RedemptionError};

/// Default lifetime of a newly issued code, in days.
pub const CODE_LIFETIME_DAYS: i64 = 365;

/// Everything needed to issue a code except the code text itself.
///
/// The generator supplies the text; callers supply the grant and provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSpec {
    /// Number of credits this code grants.
    pub credits: i32,

    /// Product the credits apply to.
    pub product_id: ProductId,

    /// Settled purchase that paid for this code (purchase-issued codes).
    pub transaction_id: Option<TransactionId>,

    /// Distributor the code was minted for (batch-issued codes).
    pub distributor_id: Option<DistributorId>,

    /// Buyer's email (purchase-issued codes).
    pub customer_email: Option<EmailAddress>,

    /// Price paid for this code, if money changed hands.
    pub purchase_price: Option<Decimal>,

    /// When the code stops being redeemable.
    pub expires_at: Timestamp,
}

/// Credit code entity.
///
/// # Invariants
///
/// - `code` is globally unique
/// - `credits > 0`
/// - `is_redeemed` implies `redeemed_at` and `redeemed_by` are set
/// - Once redeemed, a code never becomes unredeemed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCode {
    /// Row identifier, used for foreign keys and audit records.
    pub id: CreditCodeId,

    /// The redeemable code text.
    pub code: RedemptionCode,

    /// Number of credits this code grants.
    pub credits: i32,

    /// Product the credits apply to.
    pub product_id: ProductId,

    /// Settled purchase that paid for this code (if purchase-issued).
    pub transaction_id: Option<TransactionId>,

    /// Distributor the code was minted for (if batch-issued).
    pub distributor_id: Option<DistributorId>,

    /// Buyer's email (if purchase-issued).
    pub customer_email: Option<EmailAddress>,

    /// Price paid for this code, if money changed hands.
    pub purchase_price: Option<Decimal>,

    /// When the code stops being redeemable.
    pub expires_at: Timestamp,

    /// Whether the code has been redeemed.
    pub is_redeemed: bool,

    /// When the code was redeemed.
    pub redeemed_at: Option<Timestamp>,

    /// Who redeemed the code.
    pub redeemed_by: Option<EmailAddress>,

    /// When the code was issued.
    pub created_at: Timestamp,
}

impl CreditCode {
    /// Issue a new, unredeemed code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `credits` is not positive.
    pub fn issue(code: RedemptionCode, spec: IssueSpec) -> Result<Self, ValidationError> {
        if spec.credits <= 0 {
            return Err(ValidationError::out_of_range(
                "credits",
                1,
                i32::MAX,
                spec.credits,
            ));
        }

        Ok(Self {
            id: CreditCodeId::new(),
            code,
            credits: spec.credits,
            product_id: spec.product_id,
            transaction_id: spec.transaction_id,
            distributor_id: spec.distributor_id,
            customer_email: spec.customer_email,
            purchase_price: spec.purchase_price,
            expires_at: spec.expires_at,
            is_redeemed: false,
            redeemed_at: None,
            redeemed_by: None,
            created_at: Timestamp::now(),
        })
    }

    /// Whether the code's expiry has passed.
    ///
    /// A code expiring exactly at `now` is still redeemable.
    pub fn is_expired(&self, now: &Timestamp) -> bool {
        self.expires_at.is_before(now)
    }

    /// Whether the code can be redeemed at `now`.
    pub fn is_redeemable(&self, now: &Timestamp) -> bool {
        !self.is_redeemed && !self.is_expired(now)
    }

    /// Redeem the code, recording who and when.
    ///
    /// Checks expiry before redemption state: an expired code fails `Expired`
    /// regardless of whether anyone redeemed it. The persistent counterpart of
    /// this method is the store's conditional update; this in-memory form
    /// exists for the domain rules and their tests.
    ///
    /// # Errors
    ///
    /// - `RedemptionError::Expired` if the code's expiry has passed
    /// - `RedemptionError::AlreadyRedeemed` with the prior `redeemed_at` if
    ///   the code was redeemed before this call
    pub fn redeem(
        &mut self,
        redeemed_by: EmailAddress,
        now: Timestamp,
    ) -> Result<(), RedemptionError> {
        if self.is_expired(&now) {
            return Err(RedemptionError::expired(self.expires_at));
        }
        if self.is_redeemed {
            return Err(RedemptionError::already_redeemed(self.redeemed_at));
        }

        self.is_redeemed = true;
        self.redeemed_at = Some(now);
        self.redeemed_by = Some(redeemed_by);
        Ok(())
    }
}
