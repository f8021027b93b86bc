//! HTTP adapter for redemption endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{RedeemCodeRequest, RedeemCodeResponse, ValidateCodeResponse};
pub use handlers::{redeem_code, validate_code, RedemptionApiError, RedemptionAppState};
pub use routes::redemption_routes;
