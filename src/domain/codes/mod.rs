//! Credit codes domain module.
//!
//! Handles code format, issuance, and single-use redemption.
//!
//! # Module Structure
//!
//! - `format` - Code text grammar and the minting alphabet
//! - `credit_code` - CreditCode entity and issue spec
//! - `generator` - Random generation fused with store uniqueness
//! - `errors` - Redemption and issuance outcomes

mod credit_code;
mod errors;
mod format;
mod generator;

pub use credit_code::{CreditCode, IssueSpec, CODE_LIFETIME_DAYS};
pub use errors::{IssuanceError, RedemptionError};
pub use format::{RedemptionCode, CODE_ALPHABET, CODE_LEN, GROUP_COUNT, GROUP_LEN};
pub use generator::{CodeGenerator, MAX_GENERATION_ATTEMPTS};
