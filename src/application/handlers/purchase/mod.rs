//! Purchase handlers.
//!
//! The credit purchase flow, from intent to issued codes:
//!
//! ## Commands
//! - Creating a payment intent for a product/package selection
//! - Confirming a purchase after the client reports payment success
//! - Issuing the code batch for a settled transaction (shared with the
//!   webhook reconciler)

mod confirm_purchase;
mod create_intent;
mod issue_codes;

pub use confirm_purchase::{
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, ConfirmPurchaseResult,
};
pub use create_intent::{CreateIntentCommand, CreateIntentHandler, CreateIntentResult};
pub use issue_codes::{IssueCodesCommand, IssueCodesHandler, IssueCodesResult};
