//! Redemption handlers.
//!
//! Single-use code redemption and its read-only preview:
//!
//! ## Commands
//! - Redeeming a code for its credits
//!
//! ## Queries
//! - Validating a code without consuming it

mod redeem_code;
mod validate_code;

pub use redeem_code::{RedeemCodeCommand, RedeemCodeHandler, RedeemCodeResult};
pub use validate_code::{ValidateCodeHandler, ValidateCodeQuery, ValidateCodeResult};
