//! Notification port.
//!
//! Outbound customer notifications. The only one the purchase flow sends
//! today is the post-purchase confirmation carrying the issued codes.
//! Delivery is best-effort: a failed notification never rolls back a
//! settled purchase.

use async_trait::async_trait;

use crate::domain::codes::RedemptionCode;
use crate::domain::foundation::{DomainError, EmailAddress, TransactionId};

/// What the buyer receives after a purchase settles.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    /// Where to send the confirmation.
    pub customer_email: EmailAddress,

    /// The settled transaction.
    pub transaction_id: TransactionId,

    /// Credits across all issued codes.
    pub total_credits: i64,

    /// The issued code texts.
    pub codes: Vec<RedemptionCode>,
}

/// Port for sending customer notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send a purchase confirmation with the issued codes.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` / transport failure from the implementation
    async fn purchase_confirmation(&self, receipt: &PurchaseReceipt) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn notification_sink_is_object_safe() {
        fn _accepts_dyn(_sink: &dyn NotificationSink) {}
    }
}
