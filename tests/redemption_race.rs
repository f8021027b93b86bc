//! Integration tests for single-use redemption under concurrency.
//!
//! The redemption path has one serialization point: the store's
//! conditional update (`redeem ... WHERE is_redeemed = FALSE`). These
//! tests drive many concurrent redeemers at the same code and verify:
//! 1. Exactly one caller wins, no matter how many race
//! 2. Every loser gets `AlreadyRedeemed` carrying the winner's timestamp
//! 3. Malformed input is rejected before any store access
//! 4. Expiry is checked before the redemption state
//!
//! The in-memory store mirrors the conditional-update semantics of the
//! PostgreSQL adapter, so the win/lose outcomes here are the same ones
//! the database decides in production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use creditflow::adapters::memory::{
    InMemoryAuditLog, InMemoryCreditCodeStore, InMemoryProductCatalog,
};
use creditflow::application::{RedeemCodeCommand, RedeemCodeHandler};
use creditflow::domain::catalog::{Product, ProductStatus};
use creditflow::domain::codes::{CreditCode, IssueSpec, RedemptionCode, RedemptionError};
use creditflow::domain::foundation::{
    DomainError, EmailAddress, ProductId, Timestamp, TransactionId,
};
use creditflow::ports::{CreditCodeStore, InsertOutcome, RedeemOutcome};

// =============================================================================
// Test Infrastructure
// =============================================================================

const CODE_TEXT: &str = "ABCD-EFGH-JKLM";
const OTHER_CODE_TEXT: &str = "WXYZ-2345-6789";

/// Store wrapper that counts every call crossing the port boundary.
///
/// Used to prove that format rejection happens before any store access.
struct CountingStore {
    inner: Arc<InMemoryCreditCodeStore>,
    lookups: AtomicU32,
    redeems: AtomicU32,
}

impl CountingStore {
    fn new(inner: Arc<InMemoryCreditCodeStore>) -> Self {
        Self {
            inner,
            lookups: AtomicU32::new(0),
            redeems: AtomicU32::new(0),
        }
    }

    fn total_calls(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst) + self.redeems.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CreditCodeStore for CountingStore {
    async fn insert_if_absent(&self, code: &CreditCode) -> Result<InsertOutcome, DomainError> {
        self.inner.insert_if_absent(code).await
    }

    async fn find_by_code(
        &self,
        code: &RedemptionCode,
    ) -> Result<Option<CreditCode>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_code(code).await
    }

    async fn redeem(
        &self,
        code: &RedemptionCode,
        redeemed_by: &EmailAddress,
        redeemed_at: Timestamp,
    ) -> Result<RedeemOutcome, DomainError> {
        self.redeems.fetch_add(1, Ordering::SeqCst);
        self.inner.redeem(code, redeemed_by, redeemed_at).await
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<CreditCode>, DomainError> {
        self.inner.find_by_transaction(transaction_id).await
    }
}

struct Redemption {
    codes: Arc<InMemoryCreditCodeStore>,
    audit: Arc<InMemoryAuditLog>,
    handler: Arc<RedeemCodeHandler>,
    product_id: ProductId,
}

/// Wires a redemption handler over in-memory stores with one product.
fn redemption() -> Redemption {
    let codes = Arc::new(InMemoryCreditCodeStore::new());
    let catalog = Arc::new(InMemoryProductCatalog::new());
    let audit = Arc::new(InMemoryAuditLog::new());

    let product_id = ProductId::new();
    let product = Product::new(
        product_id,
        "Atlas Studio",
        None,
        HashMap::from([("render".to_string(), 1)]),
        ProductStatus::Active,
    )
    .expect("test product should be valid");
    catalog.add_product(product);

    let handler = Arc::new(RedeemCodeHandler::new(
        codes.clone(),
        catalog,
        audit.clone(),
    ));
    Redemption {
        codes,
        audit,
        handler,
        product_id,
    }
}

/// Seeds one code with the given text; a negative lifetime seeds it
/// already expired.
async fn seed_code(env: &Redemption, text: &str, expires_in_days: i64) {
    let code = CreditCode::issue(
        RedemptionCode::parse(text).expect("seed text should be well-formed"),
        IssueSpec {
            credits: 50,
            product_id: env.product_id,
            transaction_id: None,
            distributor_id: None,
            customer_email: None,
            purchase_price: None,
            expires_at: Timestamp::now().add_days(expires_in_days),
        },
    )
    .expect("seed spec should be valid");
    let outcome = env
        .codes
        .insert_if_absent(&code)
        .await
        .expect("seed insert should succeed");
    assert_eq!(outcome, InsertOutcome::Inserted);
}

fn redeemer(n: usize) -> EmailAddress {
    EmailAddress::new(format!("redeemer{}@example.com", n)).unwrap()
}

// =============================================================================
// Integration Tests
// =============================================================================

/// Sixteen tasks race one code. Exactly one wins; every loser observes
/// `AlreadyRedeemed` with the winning redemption's timestamp.
#[tokio::test]
async fn concurrent_redeemers_produce_exactly_one_winner() {
    let env = redemption();
    seed_code(&env, CODE_TEXT, 30).await;

    let mut tasks = Vec::new();
    for n in 0..16 {
        let handler = env.handler.clone();
        tasks.push(tokio::spawn(async move {
            handler
                .handle(RedeemCodeCommand {
                    code: CODE_TEXT.to_string(),
                    customer_email: redeemer(n),
                })
                .await
        }));
    }

    let mut wins = Vec::new();
    let mut losses = Vec::new();
    for task in tasks {
        match task.await.expect("redeemer task should not panic") {
            Ok(result) => wins.push(result),
            Err(err) => losses.push(err),
        }
    }

    assert_eq!(wins.len(), 1, "exactly one redeemer may win");
    assert_eq!(losses.len(), 15, "everyone else must lose");

    let winning_at = wins[0].redeemed_at;
    for loss in &losses {
        match loss {
            RedemptionError::AlreadyRedeemed { redeemed_at } => {
                assert_eq!(
                    *redeemed_at,
                    Some(winning_at),
                    "losers should see the winner's timestamp"
                );
            }
            other => panic!("losers must observe AlreadyRedeemed, got {:?}", other),
        }
    }

    let stored = env.codes.codes();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_redeemed);
    assert!(stored[0].redeemed_by.is_some(), "winner is recorded");

    let trail = env.audit.events_with_action("redeem_code");
    assert_eq!(trail.len(), 1, "only the winner writes an audit event");
}

/// Races on different codes do not interfere: both redeemers win their
/// own code.
#[tokio::test]
async fn distinct_codes_redeem_independently() {
    let env = redemption();
    seed_code(&env, CODE_TEXT, 30).await;
    seed_code(&env, OTHER_CODE_TEXT, 30).await;

    let first = {
        let handler = env.handler.clone();
        tokio::spawn(async move {
            handler
                .handle(RedeemCodeCommand {
                    code: CODE_TEXT.to_string(),
                    customer_email: redeemer(1),
                })
                .await
        })
    };
    let second = {
        let handler = env.handler.clone();
        tokio::spawn(async move {
            handler
                .handle(RedeemCodeCommand {
                    code: OTHER_CODE_TEXT.to_string(),
                    customer_email: redeemer(2),
                })
                .await
        })
    };

    let first = first.await.expect("task should not panic");
    let second = second.await.expect("task should not panic");
    assert!(first.is_ok(), "first code should redeem: {:?}", first);
    assert!(second.is_ok(), "second code should redeem: {:?}", second);
}

/// Malformed text fails the format check and never crosses the port
/// boundary.
#[tokio::test]
async fn malformed_code_never_reaches_the_store() {
    let env = redemption();
    let counting = Arc::new(CountingStore::new(env.codes.clone()));
    let handler = RedeemCodeHandler::new(
        counting.clone(),
        Arc::new(InMemoryProductCatalog::new()),
        env.audit.clone(),
    );

    let err = handler
        .handle(RedeemCodeCommand {
            code: "definitely-not-a-code".to_string(),
            customer_email: redeemer(0),
        })
        .await
        .expect_err("malformed text must be rejected");

    assert!(
        matches!(err, RedemptionError::InvalidFormat { .. }),
        "expected InvalidFormat, got {:?}",
        err
    );
    assert_eq!(
        counting.total_calls(),
        0,
        "format rejection must not touch the store"
    );
}

/// An expired code reports `Expired` before the redemption state is
/// consulted, and the row stays unredeemed.
#[tokio::test]
async fn expired_code_is_rejected_without_redeeming() {
    let env = redemption();
    seed_code(&env, CODE_TEXT, -1).await;

    let err = env
        .handler
        .handle(RedeemCodeCommand {
            code: CODE_TEXT.to_string(),
            customer_email: redeemer(0),
        })
        .await
        .expect_err("expired code must not redeem");

    assert!(
        matches!(err, RedemptionError::Expired { .. }),
        "expected Expired, got {:?}",
        err
    );
    let stored = env.codes.codes();
    assert!(!stored[0].is_redeemed, "expired row must stay untouched");
}

/// A code that was never issued reports `NotFound`, not a server error.
#[tokio::test]
async fn unknown_code_reports_not_found() {
    let env = redemption();

    let err = env
        .handler
        .handle(RedeemCodeCommand {
            code: "NPQR-STUV-WXYZ".to_string(),
            customer_email: redeemer(0),
        })
        .await
        .expect_err("unknown code must not redeem");

    assert!(
        matches!(err, RedemptionError::NotFound(_)),
        "expected NotFound, got {:?}",
        err
    );
}
