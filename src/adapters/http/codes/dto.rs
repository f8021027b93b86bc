//! Data transfer objects for code administration endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::codes::GenerateBatchResult;
use crate::domain::codes::CreditCode;
use crate::domain::foundation::{CreditCodeId, Timestamp};

/// Request body for `POST /api/codes/generate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodesRequest {
    pub product_id: String,
    pub credits: i32,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub distributor_id: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<Decimal>,
    #[serde(default = "default_expires_in_days")]
    pub expires_in_days: i64,
}

fn default_quantity() -> u32 {
    1
}

fn default_expires_in_days() -> i64 {
    365
}

/// One generated code as returned to the issuer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCodeResponse {
    pub id: CreditCodeId,
    pub code: String,
    pub credits: i32,
    pub expires_at: Timestamp,
}

impl From<&CreditCode> for GeneratedCodeResponse {
    fn from(code: &CreditCode) -> Self {
        Self {
            id: code.id,
            code: code.code.as_str().to_string(),
            credits: code.credits,
            expires_at: code.expires_at,
        }
    }
}

/// Response body for `POST /api/codes/generate`.
///
/// `generatedCount` can be lower than `requestedCount`: the mint loop
/// tolerates per-slot failures and reports the subset actually issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodesResponse {
    pub codes: Vec<GeneratedCodeResponse>,
    pub generated_count: usize,
    pub requested_count: u32,
}

impl From<GenerateBatchResult> for GenerateCodesResponse {
    fn from(result: GenerateBatchResult) -> Self {
        Self {
            generated_count: result.codes.len(),
            requested_count: result.requested,
            codes: result
                .codes
                .iter()
                .map(GeneratedCodeResponse::from)
                .collect(),
        }
    }
}
