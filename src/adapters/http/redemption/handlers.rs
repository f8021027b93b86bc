//! HTTP handlers for code redemption.
//!
//! Redemption is the one surface where "failure" is usually a normal
//! outcome: the status ladder (400/404/409/410) and the structured
//! `errorCode` are part of the contract, not incidental error handling.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::response::{domain_failure, failure, success, ApiErrorBody};
use super::dto::{RedeemCodeRequest, RedeemCodeResponse, ValidateCodeResponse};
use crate::application::handlers::redemption::{
    RedeemCodeCommand, RedeemCodeHandler, ValidateCodeHandler, ValidateCodeQuery,
};
use crate::domain::codes::RedemptionError;
use crate::domain::foundation::{DomainError, EmailAddress, ValidationError};
use crate::ports::{AuditLog, CreditCodeStore, ProductCatalog};

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for redemption endpoints.
#[derive(Clone)]
pub struct RedemptionAppState {
    pub codes: Arc<dyn CreditCodeStore>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub audit: Arc<dyn AuditLog>,
}

impl RedemptionAppState {
    pub fn redeem_code_handler(&self) -> RedeemCodeHandler {
        RedeemCodeHandler::new(
            Arc::clone(&self.codes),
            Arc::clone(&self.catalog),
            Arc::clone(&self.audit),
        )
    }

    pub fn validate_code_handler(&self) -> ValidateCodeHandler {
        ValidateCodeHandler::new(Arc::clone(&self.codes), Arc::clone(&self.catalog))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/redeem-code - Redeem a code for its credits.
pub async fn redeem_code(
    State(state): State<RedemptionAppState>,
    Json(request): Json<RedeemCodeRequest>,
) -> Result<impl IntoResponse, RedemptionApiError> {
    let customer_email = EmailAddress::new(request.customer_email)?;

    let result = state
        .redeem_code_handler()
        .handle(RedeemCodeCommand {
            code: request.code,
            customer_email,
        })
        .await?;

    Ok(success(RedeemCodeResponse::from(result)))
}

/// GET /api/validate-code/:code - Preview a code without consuming it.
pub async fn validate_code(
    State(state): State<RedemptionAppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, RedemptionApiError> {
    let result = state
        .validate_code_handler()
        .handle(ValidateCodeQuery { code })
        .await?;

    Ok(success(ValidateCodeResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// Error wrapper translating redemption failures into the API envelope.
///
/// Redemption outcomes carry their own status ladder; anything else goes
/// through the standard domain mapping.
#[derive(Debug)]
pub enum RedemptionApiError {
    Redemption(RedemptionError),
    Domain(DomainError),
}

impl From<RedemptionError> for RedemptionApiError {
    fn from(err: RedemptionError) -> Self {
        RedemptionApiError::Redemption(err)
    }
}

impl From<DomainError> for RedemptionApiError {
    fn from(err: DomainError) -> Self {
        RedemptionApiError::Domain(err)
    }
}

impl From<ValidationError> for RedemptionApiError {
    fn from(err: ValidationError) -> Self {
        RedemptionApiError::Domain(err.into())
    }
}

impl IntoResponse for RedemptionApiError {
    fn into_response(self) -> Response {
        match self {
            RedemptionApiError::Redemption(err) => {
                let status = match &err {
                    RedemptionError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,
                    RedemptionError::NotFound(_) => StatusCode::NOT_FOUND,
                    RedemptionError::AlreadyRedeemed { .. } => StatusCode::CONFLICT,
                    RedemptionError::Expired { .. } => StatusCode::GONE,
                    RedemptionError::Infrastructure(_) => {
                        return domain_failure(err.into());
                    }
                };
                let mut body = ApiErrorBody::new(err.code(), err.message());
                if let Some(redeemed_at) = err.redeemed_at() {
                    body = body.with_redeemed_at(redeemed_at);
                }
                failure(status, body)
            }
            RedemptionApiError::Domain(err) => domain_failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::adapters::memory::{
        InMemoryAuditLog, InMemoryCreditCodeStore, InMemoryProductCatalog,
    };
    use crate::domain::catalog::{Product, ProductStatus};
    use crate::domain::codes::{CreditCode, IssueSpec, RedemptionCode};
    use crate::domain::foundation::{ProductId, Timestamp};
    use crate::ports::InsertOutcome;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct TestContext {
        state: RedemptionAppState,
        codes: Arc<InMemoryCreditCodeStore>,
        product_id: ProductId,
    }

    async fn test_context() -> TestContext {
        let codes = Arc::new(InMemoryCreditCodeStore::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());

        let product = Product::new(
            ProductId::new(),
            "Dental Scanner".to_string(),
            None,
            HashMap::from([("scan".to_string(), 5)]),
            ProductStatus::Active,
        )
        .unwrap();
        let product_id = product.id;
        catalog.add_product(product);

        let state = RedemptionAppState {
            codes: Arc::clone(&codes) as Arc<dyn CreditCodeStore>,
            catalog,
            audit: Arc::new(InMemoryAuditLog::new()),
        };
        TestContext {
            state,
            codes,
            product_id,
        }
    }

    async fn seed_code(context: &TestContext, text: &str, expires_at: Timestamp) {
        let code = CreditCode::issue(
            RedemptionCode::parse(text).unwrap(),
            IssueSpec {
                credits: 50,
                product_id: context.product_id,
                transaction_id: None,
                distributor_id: None,
                customer_email: None,
                purchase_price: None,
                expires_at,
            },
        )
        .unwrap();
        let outcome = context.codes.insert_if_absent(&code).await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Inserted));
    }

    fn redeem_request(code: &str) -> RedeemCodeRequest {
        RedeemCodeRequest {
            code: code.to_string(),
            customer_email: "buyer@example.com".to_string(),
        }
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Redeem Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn redeem_valid_code_returns_grant() {
        let context = test_context().await;
        seed_code(&context, "ABCD-EFGH-JKLM", Timestamp::now().add_days(30)).await;

        let response = redeem_code(
            State(context.state.clone()),
            Json(redeem_request("ABCD-EFGH-JKLM")),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["credits"], 50);
        assert_eq!(body["data"]["product"], "Dental Scanner");
        assert!(body["data"].get("redeemedAt").is_some());
    }

    #[tokio::test]
    async fn redeem_unknown_code_returns_404() {
        let context = test_context().await;

        let result = redeem_code(
            State(context.state.clone()),
            Json(redeem_request("ABCD-EFGH-JKLM")),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn redeem_malformed_code_returns_400_without_store_lookup() {
        let context = test_context().await;

        let result = redeem_code(
            State(context.state.clone()),
            Json(redeem_request("definitely not a code")),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_FORMAT");
    }

    #[tokio::test]
    async fn redeem_twice_returns_409_with_redeemed_at() {
        let context = test_context().await;
        seed_code(&context, "ABCD-EFGH-JKLM", Timestamp::now().add_days(30)).await;

        redeem_code(
            State(context.state.clone()),
            Json(redeem_request("ABCD-EFGH-JKLM")),
        )
        .await
        .unwrap();

        let result = redeem_code(
            State(context.state.clone()),
            Json(redeem_request("ABCD-EFGH-JKLM")),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "ALREADY_REDEEMED");
        assert!(body["error"].get("redeemedAt").is_some());
    }

    #[tokio::test]
    async fn redeem_expired_code_returns_410() {
        let context = test_context().await;
        seed_code(&context, "ABCD-EFGH-JKLM", Timestamp::now().minus_days(1)).await;

        let result = redeem_code(
            State(context.state.clone()),
            Json(redeem_request("ABCD-EFGH-JKLM")),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::GONE);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "EXPIRED");
    }

    #[tokio::test]
    async fn redeem_with_invalid_email_returns_400() {
        let context = test_context().await;
        seed_code(&context, "ABCD-EFGH-JKLM", Timestamp::now().add_days(30)).await;

        let result = redeem_code(
            State(context.state.clone()),
            Json(RedeemCodeRequest {
                code: "ABCD-EFGH-JKLM".to_string(),
                customer_email: "not an email".to_string(),
            }),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validate Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn validate_redeemable_code_returns_valid() {
        let context = test_context().await;
        seed_code(&context, "WXYZ-2345-6789", Timestamp::now().add_days(30)).await;

        let response = validate_code(
            State(context.state.clone()),
            Path("WXYZ-2345-6789".to_string()),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["data"]["valid"], true);
        assert_eq!(body["data"]["credits"], 50);
        assert_eq!(body["data"]["product"], "Dental Scanner");
    }

    #[tokio::test]
    async fn validate_unknown_code_answers_200_with_valid_false() {
        let context = test_context().await;

        let response = validate_code(
            State(context.state.clone()),
            Path("WXYZ-2345-6789".to_string()),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["data"]["valid"], false);
        assert_eq!(body["data"]["errorCode"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn validate_redeemed_code_reports_already_redeemed() {
        let context = test_context().await;
        seed_code(&context, "WXYZ-2345-6789", Timestamp::now().add_days(30)).await;
        redeem_code(
            State(context.state.clone()),
            Json(redeem_request("WXYZ-2345-6789")),
        )
        .await
        .unwrap();

        let response = validate_code(
            State(context.state.clone()),
            Path("WXYZ-2345-6789".to_string()),
        )
        .await
        .unwrap()
        .into_response();

        let body = response_json(response).await;
        assert_eq!(body["data"]["valid"], false);
        assert_eq!(body["data"]["errorCode"], "ALREADY_REDEEMED");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn redemption_errors_map_to_their_statuses() {
        let cases = [
            (
                RedemptionError::invalid_format("bad length"),
                StatusCode::BAD_REQUEST,
            ),
            (
                RedemptionError::not_found("ABCD-EFGH-JKLM"),
                StatusCode::NOT_FOUND,
            ),
            (
                RedemptionError::already_redeemed(None),
                StatusCode::CONFLICT,
            ),
            (
                RedemptionError::expired(Timestamp::now().minus_days(1)),
                StatusCode::GONE,
            ),
            (
                RedemptionError::infrastructure("store down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = RedemptionApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
