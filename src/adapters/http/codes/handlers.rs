//! HTTP handlers for code administration.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::middleware::CallerCapability;
use super::super::response::{domain_failure, success};
use super::dto::{GenerateCodesRequest, GenerateCodesResponse};
use crate::application::handlers::codes::{GenerateBatchCommand, GenerateBatchHandler};
use crate::domain::foundation::{DistributorId, DomainError, ProductId, ValidationError};
use crate::ports::{AuditLog, CreditCodeStore, InventoryStore, ProductCatalog};

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for code administration endpoints.
#[derive(Clone)]
pub struct CodesAppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub codes: Arc<dyn CreditCodeStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub audit: Arc<dyn AuditLog>,
}

impl CodesAppState {
    pub fn generate_batch_handler(&self) -> GenerateBatchHandler {
        GenerateBatchHandler::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.codes),
            Arc::clone(&self.inventory),
            Arc::clone(&self.audit),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/codes/generate - Mint a code batch.
///
/// Guarded by the caller's capability: admins mint for anyone, a
/// distributor only for their own id.
pub async fn generate_codes(
    State(state): State<CodesAppState>,
    CallerCapability(capability): CallerCapability,
    Json(request): Json<GenerateCodesRequest>,
) -> Result<impl IntoResponse, CodesApiError> {
    let product_id = request.product_id.parse::<ProductId>().map_err(|_| {
        CodesApiError::from(DomainError::from(ValidationError::invalid_format(
            "productId",
            "expected a UUID",
        )))
    })?;
    let distributor_id = request
        .distributor_id
        .as_deref()
        .map(|raw| raw.parse::<DistributorId>())
        .transpose()
        .map_err(|_| {
            CodesApiError::from(DomainError::from(ValidationError::invalid_format(
                "distributorId",
                "expected a UUID",
            )))
        })?;

    let result = state
        .generate_batch_handler()
        .handle(GenerateBatchCommand {
            capability,
            product_id,
            credits: request.credits,
            quantity: request.quantity,
            distributor_id,
            purchase_price: request.purchase_price,
            expires_in_days: request.expires_in_days,
        })
        .await?;

    Ok(success(GenerateCodesResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// Error wrapper translating code administration failures into the API
/// envelope.
#[derive(Debug)]
pub struct CodesApiError(DomainError);

impl From<DomainError> for CodesApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CodesApiError {
    fn into_response(self) -> Response {
        domain_failure(self.0)
    }
}
