//! HTTP handlers for the purchase flow.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::response::{domain_failure, success};
use super::dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreateIntentRequest, CreateIntentResponse,
};
use crate::application::handlers::purchase::{
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, CreateIntentCommand, CreateIntentHandler,
    IssueCodesHandler,
};
use crate::domain::foundation::{
    DomainError, EmailAddress, PackageId, ProductId, ValidationError,
};
use crate::ports::{
    AuditLog, CreditCodeStore, InventoryStore, NotificationSink, PaymentGateway, ProductCatalog,
    TransactionStore,
};

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for purchase endpoints.
#[derive(Clone)]
pub struct PurchaseAppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub transactions: Arc<dyn TransactionStore>,
    pub codes: Arc<dyn CreditCodeStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub audit: Arc<dyn AuditLog>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifications: Arc<dyn NotificationSink>,
}

impl PurchaseAppState {
    pub fn create_intent_handler(&self) -> CreateIntentHandler {
        CreateIntentHandler::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.transactions),
            Arc::clone(&self.gateway),
        )
    }

    pub fn confirm_purchase_handler(&self) -> ConfirmPurchaseHandler {
        let issuance = Arc::new(IssueCodesHandler::new(
            Arc::clone(&self.codes),
            Arc::clone(&self.inventory),
            Arc::clone(&self.audit),
        ));
        ConfirmPurchaseHandler::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.transactions),
            Arc::clone(&self.codes),
            issuance,
            Arc::clone(&self.notifications),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP Handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/create-payment-intent - Open a pending purchase and its
/// gateway intent for the selected product and package.
pub async fn create_payment_intent(
    State(state): State<PurchaseAppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let product_id = parse_uuid_field::<ProductId>(&request.product_id, "productId")?;
    let package_id = parse_uuid_field::<PackageId>(&request.package_id, "packageId")?;
    let customer_email = EmailAddress::new(request.customer_email)?;

    let result = state
        .create_intent_handler()
        .handle(CreateIntentCommand {
            product_id,
            package_id,
            customer_email,
            idempotency_key: request.idempotency_key,
        })
        .await?;

    Ok(success(CreateIntentResponse::from(result)))
}

/// POST /api/confirm-payment - Settle the purchase after the client reports
/// payment success; idempotent on repeated calls with the same intent.
pub async fn confirm_payment(
    State(state): State<PurchaseAppState>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, PurchaseApiError> {
    let customer_email = request.customer_email.map(EmailAddress::new).transpose()?;

    let result = state
        .confirm_purchase_handler()
        .handle(ConfirmPurchaseCommand {
            intent_id: request.intent_id,
            customer_email,
        })
        .await?;

    Ok(success(ConfirmPaymentResponse::from(result)))
}

fn parse_uuid_field<T: std::str::FromStr>(raw: &str, field: &str) -> Result<T, PurchaseApiError> {
    raw.parse::<T>().map_err(|_| {
        PurchaseApiError::from(DomainError::from(ValidationError::invalid_format(
            field,
            "expected a UUID",
        )))
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// Error wrapper translating purchase failures into the API envelope.
#[derive(Debug)]
pub struct PurchaseApiError(DomainError);

impl From<DomainError> for PurchaseApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for PurchaseApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PurchaseApiError {
    fn into_response(self) -> Response {
        domain_failure(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    use crate::adapters::memory::{
        InMemoryAuditLog, InMemoryCreditCodeStore, InMemoryInventoryStore,
        InMemoryProductCatalog, InMemoryTransactionStore,
    };
    use crate::adapters::notifications::LogNotificationSink;
    use crate::adapters::stripe::MockGateway;
    use crate::domain::catalog::{CreditPackage, Product, ProductStatus};
    use crate::domain::foundation::ErrorCode;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct TestContext {
        state: PurchaseAppState,
        gateway: Arc<MockGateway>,
        product_id: ProductId,
        package_id: PackageId,
    }

    fn test_context() -> TestContext {
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let gateway = Arc::new(MockGateway::new());

        let product = Product::new(
            ProductId::new(),
            "Dental Scanner".to_string(),
            None,
            HashMap::from([("scan".to_string(), 5)]),
            ProductStatus::Active,
        )
        .unwrap();
        let product_id = product.id;
        let package = CreditPackage::new(
            PackageId::new(),
            product_id,
            "Starter".to_string(),
            50,
            Decimal::from_str("19.99").unwrap(),
            true,
        )
        .unwrap();
        let package_id = package.id;
        catalog.add_product(product);
        catalog.add_package(package);

        let state = PurchaseAppState {
            catalog,
            transactions: Arc::new(InMemoryTransactionStore::new()),
            codes: Arc::new(InMemoryCreditCodeStore::new()),
            inventory: Arc::new(InMemoryInventoryStore::new()),
            audit: Arc::new(InMemoryAuditLog::new()),
            gateway: Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
            notifications: Arc::new(LogNotificationSink::new()),
        };
        TestContext {
            state,
            gateway,
            product_id,
            package_id,
        }
    }

    fn intent_request(context: &TestContext) -> CreateIntentRequest {
        CreateIntentRequest {
            product_id: context.product_id.to_string(),
            package_id: context.package_id.to_string(),
            customer_email: "buyer@example.com".to_string(),
            idempotency_key: None,
        }
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Runs the create endpoint and returns the new intent id.
    async fn open_intent(context: &TestContext) -> String {
        let response = create_payment_intent(
            State(context.state.clone()),
            Json(intent_request(context)),
        )
        .await
        .unwrap()
        .into_response();
        let body = response_json(response).await;
        body["data"]["intentId"].as_str().unwrap().to_string()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Create Intent Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_intent_returns_client_secret_and_amount() {
        let context = test_context();

        let response = create_payment_intent(
            State(context.state.clone()),
            Json(intent_request(&context)),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert!(body["data"]["clientSecret"].as_str().is_some());
        assert!(body["data"]["intentId"]
            .as_str()
            .unwrap()
            .starts_with("pi_mock_"));
        assert_eq!(body["data"]["amount"], "19.99");
        assert_eq!(body["data"]["currency"], "usd");
    }

    #[tokio::test]
    async fn create_intent_with_unknown_product_returns_404() {
        let context = test_context();
        let mut request = intent_request(&context);
        request.product_id = ProductId::new().to_string();

        let result = create_payment_intent(State(context.state.clone()), Json(request)).await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "PRODUCT_NOT_FOUND");
    }

    #[tokio::test]
    async fn create_intent_with_malformed_product_id_returns_400() {
        let context = test_context();
        let mut request = intent_request(&context);
        request.product_id = "not-a-uuid".to_string();

        let result = create_payment_intent(State(context.state.clone()), Json(request)).await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_intent_reuses_pending_row_for_same_idempotency_key() {
        let context = test_context();
        let mut request = intent_request(&context);
        request.idempotency_key = Some("order-42".to_string());

        let first = create_payment_intent(
            State(context.state.clone()),
            Json(request.clone()),
        )
        .await
        .unwrap()
        .into_response();
        let second = create_payment_intent(State(context.state.clone()), Json(request))
            .await
            .unwrap()
            .into_response();

        let first_body = response_json(first).await;
        let second_body = response_json(second).await;
        assert_eq!(
            first_body["data"]["intentId"],
            second_body["data"]["intentId"]
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Confirm Payment Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn confirm_after_settlement_returns_issued_codes() {
        let context = test_context();
        let intent_id = open_intent(&context).await;
        context.gateway.settle_intent(&intent_id);

        let response = confirm_payment(
            State(context.state.clone()),
            Json(ConfirmPaymentRequest {
                intent_id,
                customer_email: None,
            }),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["data"]["creditsPurchased"], 50);
        let codes = body["data"]["codes"].as_array().unwrap();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0]["credits"], 50);
        assert!(codes[0].get("expiresAt").is_some());
    }

    #[tokio::test]
    async fn confirm_is_idempotent_for_repeated_calls() {
        let context = test_context();
        let intent_id = open_intent(&context).await;
        context.gateway.settle_intent(&intent_id);

        let first = confirm_payment(
            State(context.state.clone()),
            Json(ConfirmPaymentRequest {
                intent_id: intent_id.clone(),
                customer_email: None,
            }),
        )
        .await
        .unwrap()
        .into_response();
        let second = confirm_payment(
            State(context.state.clone()),
            Json(ConfirmPaymentRequest {
                intent_id,
                customer_email: None,
            }),
        )
        .await
        .unwrap()
        .into_response();

        let first_body = response_json(first).await;
        let second_body = response_json(second).await;
        assert_eq!(
            first_body["data"]["codes"][0]["code"],
            second_body["data"]["codes"][0]["code"]
        );
        assert_eq!(second_body["data"]["codes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn confirm_unsettled_intent_returns_402() {
        let context = test_context();
        let intent_id = open_intent(&context).await;

        let result = confirm_payment(
            State(context.state.clone()),
            Json(ConfirmPaymentRequest {
                intent_id,
                customer_email: None,
            }),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = response_json(response).await;
        assert_eq!(body["error"]["code"], "PAYMENT_NOT_SETTLED");
    }

    #[tokio::test]
    async fn confirm_unknown_intent_returns_402() {
        let context = test_context();

        let result = confirm_payment(
            State(context.state.clone()),
            Json(ConfirmPaymentRequest {
                intent_id: "pi_never_created".to_string(),
                customer_email: None,
            }),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn payment_not_settled_maps_to_402() {
        let err = PurchaseApiError::from(DomainError::new(
            ErrorCode::PaymentNotSettled,
            "Payment has not settled yet",
        ));
        assert_eq!(err.into_response().status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn package_mismatch_maps_to_400() {
        let err = PurchaseApiError::from(DomainError::new(
            ErrorCode::PackageProductMismatch,
            "Package does not belong to product",
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
