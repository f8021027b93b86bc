//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod catalog;
pub mod codes;
pub mod purchase;
pub mod redemption;
pub mod webhooks;

// Purchase flow
pub use purchase::{
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, ConfirmPurchaseResult, CreateIntentCommand,
    CreateIntentHandler, CreateIntentResult, IssueCodesCommand, IssueCodesHandler,
    IssueCodesResult,
};

// Redemption
pub use redemption::{
    RedeemCodeCommand, RedeemCodeHandler, RedeemCodeResult, ValidateCodeHandler,
    ValidateCodeQuery, ValidateCodeResult,
};

// Webhook reconciliation
pub use webhooks::{
    ProcessEventCommand, ProcessEventHandler, ProcessEventResult, PruneJournalCommand,
    PruneJournalHandler,
};

// Catalog
pub use catalog::{ListProductsHandler, ListProductsQuery, ProductWithPackages};

// Code administration
pub use codes::{GenerateBatchCommand, GenerateBatchHandler, GenerateBatchResult};
