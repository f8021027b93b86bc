//! Log-backed notification sink.
//!
//! Writes purchase confirmations to the structured log instead of an email
//! provider. Used in development and as the default until an outbound
//! email adapter is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::DomainError;
use crate::ports::{NotificationSink, PurchaseReceipt};

/// Notification sink that records confirmations in the application log.
pub struct LogNotificationSink;

impl LogNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn purchase_confirmation(&self, receipt: &PurchaseReceipt) -> Result<(), DomainError> {
        let codes: Vec<&str> = receipt.codes.iter().map(|c| c.as_str()).collect();
        info!(
            customer_email = %receipt.customer_email,
            transaction_id = %receipt.transaction_id,
            total_credits = receipt.total_credits,
            codes = ?codes,
            "purchase confirmation"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codes::RedemptionCode;
    use crate::domain::foundation::{EmailAddress, TransactionId};

    #[tokio::test]
    async fn confirmation_never_fails() {
        let sink = LogNotificationSink::new();
        let receipt = PurchaseReceipt {
            customer_email: EmailAddress::new("buyer@example.com").unwrap(),
            transaction_id: TransactionId::new(),
            total_credits: 200,
            codes: vec![RedemptionCode::parse("ABCD-EFGH-JKLM").unwrap()],
        };

        assert!(sink.purchase_confirmation(&receipt).await.is_ok());
    }
}
