//! Integration tests for the purchase-to-redemption lifecycle.
//!
//! These tests verify the end-to-end flow:
//! 1. CreateIntentHandler opens a gateway intent and a pending transaction
//! 2. The customer pays (the mock gateway flips the intent to Succeeded)
//! 3. ConfirmPurchaseHandler wins or loses the completion edge and returns codes
//! 4. ProcessEventHandler reconciles webhook deliveries for the same intent
//! 5. RedeemCodeHandler grants the purchased credits exactly once
//!
//! Uses the in-memory stores and the mock gateway, so the whole platform
//! runs without external dependencies. The one invariant every test here
//! guards is single issuance: however many paths observe a settled payment,
//! exactly one set of codes exists for it.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use creditflow::adapters::memory::{
    InMemoryAuditLog, InMemoryCreditCodeStore, InMemoryInventoryStore,
    InMemoryProcessedEventStore, InMemoryProductCatalog, InMemoryTransactionStore,
};
use creditflow::adapters::notifications::LogNotificationSink;
use creditflow::adapters::stripe::MockGateway;
use creditflow::application::{
    ConfirmPurchaseCommand, ConfirmPurchaseHandler, CreateIntentCommand, CreateIntentHandler,
    CreateIntentResult, IssueCodesHandler, ProcessEventCommand, ProcessEventHandler,
    ProcessEventResult, RedeemCodeCommand, RedeemCodeHandler,
};
use creditflow::domain::catalog::{CreditPackage, Product, ProductStatus};
use creditflow::domain::codes::RedemptionError;
use creditflow::domain::foundation::{EmailAddress, ErrorCode, PackageId, ProductId};
use creditflow::domain::ledger::TransactionStatus;

// =============================================================================
// Test Infrastructure
// =============================================================================

const PRODUCT_NAME: &str = "Atlas Studio";
const PACKAGE_CREDITS: i32 = 50;
const PACKAGE_PRICE: &str = "19.99";
const PACKAGE_PRICE_MINOR: i64 = 1999;

/// The whole platform wired over in-memory stores and a mock gateway.
struct Platform {
    gateway: Arc<MockGateway>,
    transactions: Arc<InMemoryTransactionStore>,
    codes: Arc<InMemoryCreditCodeStore>,
    audit: Arc<InMemoryAuditLog>,
    create_intent: CreateIntentHandler,
    confirm: ConfirmPurchaseHandler,
    process_event: ProcessEventHandler,
    redeem: RedeemCodeHandler,
    product_id: ProductId,
    package_id: PackageId,
}

impl Platform {
    fn new() -> Self {
        let gateway = Arc::new(MockGateway::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let codes = Arc::new(InMemoryCreditCodeStore::new());
        let inventory = Arc::new(InMemoryInventoryStore::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let processed_events = Arc::new(InMemoryProcessedEventStore::new());

        let product_id = ProductId::new();
        let package_id = PackageId::new();
        let product = Product::new(
            product_id,
            PRODUCT_NAME,
            Some("Rendering credits for the studio".to_string()),
            HashMap::from([("render".to_string(), 1)]),
            ProductStatus::Active,
        )
        .expect("test product should be valid");
        let package = CreditPackage::new(
            package_id,
            product_id,
            "Starter Pack",
            PACKAGE_CREDITS,
            Decimal::from_str_exact(PACKAGE_PRICE).unwrap(),
            true,
        )
        .expect("test package should be valid");
        catalog.add_product(product);
        catalog.add_package(package);

        let issuance = Arc::new(IssueCodesHandler::new(
            codes.clone(),
            inventory,
            audit.clone(),
        ));
        let create_intent =
            CreateIntentHandler::new(catalog.clone(), transactions.clone(), gateway.clone());
        let confirm = ConfirmPurchaseHandler::new(
            gateway.clone(),
            transactions.clone(),
            codes.clone(),
            issuance.clone(),
            Arc::new(LogNotificationSink::new()),
        );
        let process_event = ProcessEventHandler::new(
            gateway.clone(),
            transactions.clone(),
            processed_events,
            issuance,
            audit.clone(),
        );
        let redeem = RedeemCodeHandler::new(codes.clone(), catalog, audit.clone());

        Self {
            gateway,
            transactions,
            codes,
            audit,
            create_intent,
            confirm,
            process_event,
            redeem,
            product_id,
            package_id,
        }
    }

    /// Opens a purchase for the starter pack as `buyer()`.
    async fn open_purchase(&self) -> CreateIntentResult {
        self.create_intent
            .handle(CreateIntentCommand {
                product_id: self.product_id,
                package_id: self.package_id,
                customer_email: buyer(),
                idempotency_key: None,
            })
            .await
            .expect("opening a purchase should succeed")
    }

    /// Opens a purchase and settles its payment at the gateway.
    async fn open_paid_purchase(&self) -> CreateIntentResult {
        let opened = self.open_purchase().await;
        self.gateway.settle_intent(&opened.intent_id);
        opened
    }

    /// Delivers a succeeded-intent webhook for the given intent.
    async fn deliver_succeeded_webhook(&self, intent_id: &str) -> ProcessEventResult {
        let payload = MockGateway::succeeded_event_payload(intent_id, PACKAGE_PRICE_MINOR);
        self.process_event
            .handle(ProcessEventCommand {
                payload: payload.into_bytes(),
                signature: "t=1700000000,v1=valid".to_string(),
            })
            .await
            .expect("webhook processing should succeed")
    }
}

fn buyer() -> EmailAddress {
    EmailAddress::new("buyer@example.com").unwrap()
}

// =============================================================================
// Integration Tests
// =============================================================================

/// The happy path: open, pay, confirm. One code comes back carrying the
/// package's credits, and the ledger row is completed.
#[tokio::test]
async fn confirm_after_payment_issues_codes() {
    let platform = Platform::new();

    let opened = platform.open_paid_purchase().await;
    assert!(
        opened.intent_id.starts_with("pi_"),
        "gateway should hand out an intent id, got {}",
        opened.intent_id
    );
    assert_eq!(opened.amount, Decimal::from_str_exact(PACKAGE_PRICE).unwrap());

    let confirmed = platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id.clone(),
            customer_email: Some(buyer()),
        })
        .await
        .expect("confirm should succeed after payment settled");

    assert!(!confirmed.was_already_completed);
    assert_eq!(confirmed.codes.len(), 1, "one package buys one code");
    assert_eq!(confirmed.credits_purchased, i64::from(PACKAGE_CREDITS));
    assert_eq!(confirmed.codes[0].credits, PACKAGE_CREDITS);
    assert_eq!(
        confirmed.codes[0].transaction_id,
        Some(confirmed.transaction_id),
        "issued code should reference the settled purchase"
    );

    let transactions = platform.transactions.transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, TransactionStatus::Completed);
}

/// Confirming before the gateway reports `Succeeded` is rejected and
/// must not issue anything.
#[tokio::test]
async fn confirm_before_payment_settles_is_rejected() {
    let platform = Platform::new();

    let opened = platform.open_purchase().await;
    let err = platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id,
            customer_email: None,
        })
        .await
        .expect_err("unsettled payment must not confirm");

    assert_eq!(err.code, ErrorCode::PaymentNotSettled);
    assert!(platform.codes.codes().is_empty(), "no codes before payment");
    assert_eq!(
        platform.transactions.transactions()[0].status,
        TransactionStatus::Pending,
        "the purchase stays open for a later settlement"
    );
}

/// A client retrying confirm gets the codes already on file, not a
/// second batch.
#[tokio::test]
async fn second_confirm_returns_the_same_codes() {
    let platform = Platform::new();
    let opened = platform.open_paid_purchase().await;

    let first = platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id.clone(),
            customer_email: Some(buyer()),
        })
        .await
        .expect("first confirm should succeed");
    let second = platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id,
            customer_email: Some(buyer()),
        })
        .await
        .expect("retried confirm should succeed");

    assert!(!first.was_already_completed);
    assert!(second.was_already_completed);
    assert_eq!(second.codes.len(), 1);
    assert_eq!(second.codes[0].code, first.codes[0].code);
    assert_eq!(platform.codes.codes().len(), 1, "still exactly one code");
}

/// The webhook arriving after a synchronous confirm observes the settled
/// row and does not issue again.
#[tokio::test]
async fn webhook_after_confirm_does_not_double_issue() {
    let platform = Platform::new();
    let opened = platform.open_paid_purchase().await;

    platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id.clone(),
            customer_email: Some(buyer()),
        })
        .await
        .expect("confirm should succeed");

    let outcome = platform.deliver_succeeded_webhook(&opened.intent_id).await;
    assert!(
        matches!(outcome, ProcessEventResult::AlreadySettled { .. }),
        "webhook should lose the completion edge, got {:?}",
        outcome
    );
    assert_eq!(
        platform.codes.codes().len(),
        1,
        "the losing path must not mint"
    );
    assert_eq!(
        platform.audit.events_with_action("purchase_completed").len(),
        1,
        "the losing path must not append a second completion event"
    );
}

/// When the client never comes back, the webhook alone completes the
/// purchase, and a late confirm just reads the stored codes.
#[tokio::test]
async fn webhook_completes_purchase_when_client_never_confirms() {
    let platform = Platform::new();
    let opened = platform.open_paid_purchase().await;

    let outcome = platform.deliver_succeeded_webhook(&opened.intent_id).await;
    match outcome {
        ProcessEventResult::PurchaseCompleted {
            transaction_id,
            codes_issued,
        } => {
            assert_eq!(transaction_id, opened.transaction_id);
            assert_eq!(codes_issued, 1);
        }
        other => panic!("webhook should complete the purchase, got {:?}", other),
    }

    let late = platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id,
            customer_email: Some(buyer()),
        })
        .await
        .expect("late confirm should still succeed");
    assert!(late.was_already_completed);
    assert_eq!(late.codes.len(), 1);
    assert_eq!(platform.codes.codes().len(), 1);
}

/// A purchased code grants its credits once; the second attempt reports
/// the winning redemption's timestamp.
#[tokio::test]
async fn purchased_code_redeems_exactly_once() {
    let platform = Platform::new();
    let opened = platform.open_paid_purchase().await;
    let confirmed = platform
        .confirm
        .handle(ConfirmPurchaseCommand {
            intent_id: opened.intent_id,
            customer_email: Some(buyer()),
        })
        .await
        .expect("confirm should succeed");
    let code_text = confirmed.codes[0].code.as_str().to_string();

    let redeemed = platform
        .redeem
        .handle(RedeemCodeCommand {
            code: code_text.clone(),
            customer_email: buyer(),
        })
        .await
        .expect("first redemption should win");
    assert_eq!(redeemed.credits, PACKAGE_CREDITS);
    assert_eq!(redeemed.product, PRODUCT_NAME);

    let second = platform
        .redeem
        .handle(RedeemCodeCommand {
            code: code_text,
            customer_email: EmailAddress::new("other@example.com").unwrap(),
        })
        .await
        .expect_err("a spent code must not redeem again");
    match second {
        RedemptionError::AlreadyRedeemed { redeemed_at } => {
            assert_eq!(
                redeemed_at,
                Some(redeemed.redeemed_at),
                "loser should see the winning redemption's timestamp"
            );
        }
        other => panic!("expected AlreadyRedeemed, got {:?}", other),
    }

    let trail = platform.audit.events_with_action("redeem_code");
    assert_eq!(trail.len(), 1, "exactly one redemption in the audit trail");
    assert_eq!(trail[0].actor.as_deref(), Some("buyer@example.com"));
}
