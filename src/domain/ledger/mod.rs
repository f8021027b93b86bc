//! Ledger domain - purchase transactions and their one-way state machine.

mod transaction;

pub use transaction::{
    PurchaseSpec, Transaction, TransactionKind, TransactionStatus, TransitionOutcome,
};
