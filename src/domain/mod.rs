//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalog` - Products and their credit packages
//! - `codes` - Credit code aggregate, format rules, and the generator
//! - `ledger` - Purchase transactions and their state machine
//! - `payments` - Processor webhook events and signature verification

pub mod catalog;
pub mod codes;
pub mod foundation;
pub mod ledger;
pub mod payments;
