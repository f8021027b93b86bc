//! Data transfer objects for purchase endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::purchase::{ConfirmPurchaseResult, CreateIntentResult};
use crate::domain::codes::CreditCode;
use crate::domain::foundation::{Timestamp, TransactionId};

/// Request body for `POST /api/create-payment-intent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub product_id: String,
    pub package_id: String,
    pub customer_email: String,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Response body for `POST /api/create-payment-intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: Option<String>,
    pub intent_id: String,
    pub amount: Decimal,
    pub currency: String,
}

impl From<CreateIntentResult> for CreateIntentResponse {
    fn from(result: CreateIntentResult) -> Self {
        Self {
            client_secret: result.client_secret,
            intent_id: result.intent_id,
            amount: result.amount,
            currency: result.currency,
        }
    }
}

/// Request body for `POST /api/confirm-payment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub intent_id: String,
    #[serde(default)]
    pub customer_email: Option<String>,
}

/// One issued code as returned to the buyer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedCodeResponse {
    pub code: String,
    pub credits: i32,
    pub expires_at: Timestamp,
}

impl From<&CreditCode> for IssuedCodeResponse {
    fn from(code: &CreditCode) -> Self {
        Self {
            code: code.code.as_str().to_string(),
            credits: code.credits,
            expires_at: code.expires_at,
        }
    }
}

/// Response body for `POST /api/confirm-payment`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub transaction_id: TransactionId,
    pub credits_purchased: i64,
    pub codes: Vec<IssuedCodeResponse>,
}

impl From<ConfirmPurchaseResult> for ConfirmPaymentResponse {
    fn from(result: ConfirmPurchaseResult) -> Self {
        Self {
            transaction_id: result.transaction_id,
            credits_purchased: result.credits_purchased,
            codes: result
                .codes
                .iter()
                .map(IssuedCodeResponse::from)
                .collect(),
        }
    }
}
