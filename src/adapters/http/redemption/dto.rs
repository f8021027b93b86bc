//! Data transfer objects for redemption endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::redemption::{RedeemCodeResult, ValidateCodeResult};
use crate::domain::foundation::Timestamp;

/// Request body for `POST /api/redeem-code`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCodeRequest {
    pub code: String,
    pub customer_email: String,
}

/// Response body for a successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCodeResponse {
    pub credits: i32,
    pub product: String,
    pub redeemed_at: Timestamp,
}

impl From<RedeemCodeResult> for RedeemCodeResponse {
    fn from(result: RedeemCodeResult) -> Self {
        Self {
            credits: result.credits,
            product: result.product,
            redeemed_at: result.redeemed_at,
        }
    }
}

/// Response body for the read-only validation endpoint.
///
/// An unredeemable code is still a normal answer here: `valid` is false
/// and `errorCode` says why, with no HTTP error status involved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCodeResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl From<ValidateCodeResult> for ValidateCodeResponse {
    fn from(result: ValidateCodeResult) -> Self {
        match result {
            ValidateCodeResult::Valid {
                credits,
                product,
                expires_at,
            } => Self {
                valid: true,
                credits: Some(credits),
                product: Some(product),
                expires_at: Some(expires_at),
                error_code: None,
            },
            ValidateCodeResult::Invalid { error } => Self {
                valid: false,
                credits: None,
                product: None,
                expires_at: None,
                error_code: Some(error.code().to_string()),
            },
        }
    }
}
