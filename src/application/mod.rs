//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Purchase flow
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, ConfirmPurchaseResult,
    CreateIntentCommand, CreateIntentHandler, CreateIntentResult,
    IssueCodesCommand, IssueCodesHandler, IssueCodesResult,
    // Redemption
    RedeemCodeCommand, RedeemCodeHandler, RedeemCodeResult,
    ValidateCodeHandler, ValidateCodeQuery, ValidateCodeResult,
    // Webhook reconciliation
    ProcessEventCommand, ProcessEventHandler, ProcessEventResult,
    PruneJournalCommand, PruneJournalHandler,
    // Catalog
    ListProductsHandler, ListProductsQuery, ProductWithPackages,
    // Code administration
    GenerateBatchCommand, GenerateBatchHandler, GenerateBatchResult,
};
