//! Purchase transaction aggregate.
//!
//! The ledger owns purchase state. A transaction opens `Pending`, then moves
//! exactly once to `Completed` or `Failed`; both completion paths (the
//! synchronous confirm call and the asynchronous webhook) funnel through the
//! store's conditional update, so whichever arrives second observes a
//! terminal row and becomes a no-op.
//!
//! # Design Decisions
//!
//! - **Terminal statuses are frozen**: no transition ever leaves Completed
//!   or Failed
//! - **Money as decimals**: amounts carry the package's retail price; the
//!   gateway adapter converts to minor units at the boundary
//! - **Metadata is a JSON bag**: processor echoes (package id, quantity)
//!   travel with the row rather than widening the schema

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{
    DistributorId, DomainError, EmailAddress, ErrorCode, ProductId, StateMachine, Timestamp,
    TransactionId, ValidationError,
};

/// What kind of ledger entry this is. Purchases are the only kind today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
}

impl TransactionKind {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
        }
    }

    /// Parses the storage string form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "purchase" => Ok(TransactionKind::Purchase),
            other => Err(ValidationError::invalid_format(
                "transaction_kind",
                format!("unknown kind '{}'", other),
            )),
        }
    }
}

/// Transaction lifecycle status.
///
/// `Pending` is the only non-terminal state. The pending→terminal edge is
/// taken at most once, enforced by the store's conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Intent created, payment outcome unknown.
    Pending,

    /// Payment settled; credits were (or are being) issued.
    Completed,

    /// Payment failed or was abandoned.
    Failed,
}

impl TransactionStatus {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    /// Parses the storage string form.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "transaction_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!((self, target), (Pending, Completed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}

/// Input for opening a pending transaction.
#[derive(Debug, Clone)]
pub struct PurchaseSpec {
    pub amount: Decimal,
    pub credits: i32,
    pub customer_email: EmailAddress,
    pub product_id: ProductId,
    pub distributor_id: Option<DistributorId>,
    pub external_payment_ref: Option<String>,
    /// Caller-supplied key; repeated opens with the same key return the
    /// already-pending row instead of creating a duplicate.
    pub idempotency_key: Option<String>,
    pub metadata: Value,
}

/// Ledger record of one purchase attempt and its terminal outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for this transaction.
    pub id: TransactionId,

    /// Entry kind.
    pub kind: TransactionKind,

    /// Amount charged, in major currency units.
    pub amount: Decimal,

    /// Credits purchased per code.
    pub credits: i32,

    /// Buyer's email.
    pub customer_email: EmailAddress,

    /// Product the credits apply to.
    pub product_id: ProductId,

    /// Set when a distributor is the code recipient.
    pub distributor_id: Option<DistributorId>,

    /// Payment processor's intent id. Unique; null until an intent exists.
    pub external_payment_ref: Option<String>,

    /// Client-supplied open-idempotency key, if any.
    pub idempotency_key: Option<String>,

    /// Lifecycle status.
    pub status: TransactionStatus,

    /// Free-form JSON carried from intent creation (package id, quantity).
    pub metadata: Value,

    /// When the transaction was opened.
    pub created_at: Timestamp,

    /// When the transaction reached a terminal state.
    pub completed_at: Option<Timestamp>,
}

impl Transaction {
    /// Opens a new pending transaction from a purchase spec.
    pub fn open_pending(spec: PurchaseSpec) -> Self {
        Self {
            id: TransactionId::new(),
            kind: TransactionKind::Purchase,
            amount: spec.amount,
            credits: spec.credits,
            customer_email: spec.customer_email,
            product_id: spec.product_id,
            distributor_id: spec.distributor_id,
            external_payment_ref: spec.external_payment_ref,
            idempotency_key: spec.idempotency_key,
            status: TransactionStatus::Pending,
            metadata: spec.metadata,
            created_at: Timestamp::now(),
            completed_at: None,
        }
    }

    /// Marks this transaction completed.
    ///
    /// In-process counterpart of the store's conditional update; adapters
    /// apply this only after winning the row-level transition.
    pub fn complete(&mut self, completed_at: Timestamp) -> Result<(), DomainError> {
        self.transition_status(TransactionStatus::Completed)?;
        self.completed_at = Some(completed_at);
        Ok(())
    }

    /// Marks this transaction failed.
    pub fn fail(&mut self, failed_at: Timestamp) -> Result<(), DomainError> {
        self.transition_status(TransactionStatus::Failed)?;
        self.completed_at = Some(failed_at);
        Ok(())
    }

    /// True once the transaction has reached Completed or Failed.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Number of codes this purchase should mint, from metadata.
    ///
    /// Defaults to 1; never less than 1.
    pub fn code_quantity(&self) -> u32 {
        self.metadata
            .get("quantity")
            .and_then(Value::as_u64)
            .map(|q| q.max(1) as u32)
            .unwrap_or(1)
    }

    fn transition_status(&mut self, target: TransactionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition transaction from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}

/// Result of a conditional ledger transition.
///
/// `Applied` means this call won the pending→terminal edge; `AlreadySettled`
/// means the row was terminal before the call and nothing changed. Callers
/// trigger side effects (code issuance) only on `Applied`.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(Transaction),
    AlreadySettled(Transaction),
}

impl TransitionOutcome {
    /// True when the row was already terminal and this call had no effect.
    pub fn was_already_settled(&self) -> bool {
        matches!(self, TransitionOutcome::AlreadySettled(_))
    }

    /// The transaction row, post-call in either case.
    pub fn transaction(&self) -> &Transaction {
        match self {
            TransitionOutcome::Applied(tx) | TransitionOutcome::AlreadySettled(tx) => tx,
        }
    }

    /// Consumes the outcome, yielding the transaction row.
    pub fn into_transaction(self) -> Transaction {
        match self {
            TransitionOutcome::Applied(tx) | TransitionOutcome::AlreadySettled(tx) => tx,
        }
    }
}
