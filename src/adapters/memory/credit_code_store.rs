//! In-memory credit code store for testing.
//!
//! Mirrors the conditional-update semantics of the PostgreSQL store: the
//! redemption check and the state change happen under one lock, so exactly
//! one concurrent redeemer wins.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::codes::{CreditCode, RedemptionCode};
use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, Timestamp, TransactionId};
use crate::ports::{CreditCodeStore, InsertOutcome, RedeemOutcome};

/// In-memory credit code store for tests and local development.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryCreditCodeStore {
    codes: RwLock<Vec<CreditCode>>,
}

impl InMemoryCreditCodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            codes: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all stored codes (for test assertions).
    pub fn codes(&self) -> Vec<CreditCode> {
        self.codes
            .read()
            .expect("InMemoryCreditCodeStore: codes lock poisoned")
            .clone()
    }
}

impl Default for InMemoryCreditCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreditCodeStore for InMemoryCreditCodeStore {
    async fn insert_if_absent(
        &self,
        credit_code: &CreditCode,
    ) -> Result<InsertOutcome, DomainError> {
        let mut codes = self
            .codes
            .write()
            .expect("InMemoryCreditCodeStore: codes lock poisoned");

        if codes.iter().any(|c| c.code == credit_code.code) {
            return Ok(InsertOutcome::DuplicateCode);
        }

        codes.push(credit_code.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_code(
        &self,
        code: &RedemptionCode,
    ) -> Result<Option<CreditCode>, DomainError> {
        Ok(self
            .codes
            .read()
            .expect("InMemoryCreditCodeStore: codes lock poisoned")
            .iter()
            .find(|c| &c.code == code)
            .cloned())
    }

    async fn redeem(
        &self,
        code: &RedemptionCode,
        redeemer: &EmailAddress,
        redeemed_at: Timestamp,
    ) -> Result<RedeemOutcome, DomainError> {
        let mut codes = self
            .codes
            .write()
            .expect("InMemoryCreditCodeStore: codes lock poisoned");

        let Some(credit_code) = codes.iter_mut().find(|c| &c.code == code) else {
            return Err(DomainError::new(ErrorCode::NotFound, "No such code"));
        };

        if credit_code.is_redeemed {
            return Ok(RedeemOutcome::AlreadyRedeemed);
        }

        // Same fields the persistent store's conditional update writes;
        // expiry is the caller's check, not the store's.
        credit_code.is_redeemed = true;
        credit_code.redeemed_by = Some(redeemer.clone());
        credit_code.redeemed_at = Some(redeemed_at);
        Ok(RedeemOutcome::Redeemed(credit_code.clone()))
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Vec<CreditCode>, DomainError> {
        let mut matching: Vec<CreditCode> = self
            .codes
            .read()
            .expect("InMemoryCreditCodeStore: codes lock poisoned")
            .iter()
            .filter(|c| c.transaction_id.as_ref() == Some(transaction_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codes::IssueSpec;
    use crate::domain::foundation::ProductId;

    fn issued(text: &str, transaction_id: Option<TransactionId>) -> CreditCode {
        CreditCode::issue(
            RedemptionCode::parse(text).unwrap(),
            IssueSpec {
                credits: 10,
                product_id: ProductId::new(),
                transaction_id,
                distributor_id: None,
                customer_email: None,
                purchase_price: None,
                expires_at: Timestamp::now().add_days(365),
            },
        )
        .unwrap()
    }

    fn redeemer() -> EmailAddress {
        EmailAddress::new("redeemer@example.com").unwrap()
    }

    #[tokio::test]
    async fn insert_then_find_by_code() {
        let store = InMemoryCreditCodeStore::new();
        let code = issued("ABCD-EFGH-JKLM", None);

        let outcome = store.insert_if_absent(&code).await.unwrap();

        assert_eq!(outcome, InsertOutcome::Inserted);
        let found = store.find_by_code(&code.code).await.unwrap().unwrap();
        assert_eq!(found.id, code.id);
    }

    #[tokio::test]
    async fn duplicate_code_text_reports_collision() {
        let store = InMemoryCreditCodeStore::new();
        store
            .insert_if_absent(&issued("ABCD-EFGH-JKLM", None))
            .await
            .unwrap();

        let outcome = store
            .insert_if_absent(&issued("ABCD-EFGH-JKLM", None))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::DuplicateCode);
        assert_eq!(store.codes().len(), 1);
    }

    #[tokio::test]
    async fn redeem_applies_once() {
        let store = InMemoryCreditCodeStore::new();
        let code = issued("WXYZ-2345-6789", None);
        store.insert_if_absent(&code).await.unwrap();

        let first = store
            .redeem(&code.code, &redeemer(), Timestamp::now())
            .await
            .unwrap();
        let second = store
            .redeem(&code.code, &redeemer(), Timestamp::now())
            .await
            .unwrap();

        match first {
            RedeemOutcome::Redeemed(redeemed) => {
                assert!(redeemed.is_redeemed);
                assert_eq!(
                    redeemed.redeemed_by.as_ref().map(|e| e.as_str()),
                    Some("redeemer@example.com")
                );
            }
            RedeemOutcome::AlreadyRedeemed => panic!("first redemption should win"),
        }
        assert!(matches!(second, RedeemOutcome::AlreadyRedeemed));
    }

    #[tokio::test]
    async fn redeem_unknown_code_errors() {
        let store = InMemoryCreditCodeStore::new();

        let err = store
            .redeem(
                &RedemptionCode::parse("ABCD-EFGH-JKLM").unwrap(),
                &redeemer(),
                Timestamp::now(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn find_by_transaction_filters_and_orders() {
        let store = InMemoryCreditCodeStore::new();
        let transaction_id = TransactionId::new();
        let mut first = issued("ABCD-EFGH-JKLM", Some(transaction_id));
        first.created_at = first.created_at.minus_days(1);
        let second = issued("WXYZ-2345-6789", Some(transaction_id));
        let unrelated = issued("NPQR-STUV-WXYZ", Some(TransactionId::new()));
        store.insert_if_absent(&second).await.unwrap();
        store.insert_if_absent(&first).await.unwrap();
        store.insert_if_absent(&unrelated).await.unwrap();

        let found = store.find_by_transaction(&transaction_id).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, first.id);
        assert_eq!(found[1].id, second.id);
    }
}
