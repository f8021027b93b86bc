//! Resolved request capability, passed into core operations as plain data.
//!
//! Role resolution happens upstream (auth gateway); by the time a request
//! reaches a handler it carries one already-resolved [`Capability`] value.
//! Core operations check it and never re-derive roles mid-operation.

use std::fmt;

use super::{DistributorId, DomainError, ErrorCode};

/// The capability a request arrives with, resolved once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Unauthenticated caller.
    None,
    /// Authenticated customer.
    Customer,
    /// Distributor acting on their own account.
    Distributor(DistributorId),
    /// Platform administrator.
    Admin,
}

impl Capability {
    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        matches!(self, Capability::Admin)
    }

    /// Whether this capability may mint a code batch for the given recipient.
    ///
    /// Admins may mint for anyone, including stock batches with no
    /// distributor. A distributor may mint only for their own id.
    pub fn can_issue_for(&self, distributor: Option<&DistributorId>) -> bool {
        match (self, distributor) {
            (Capability::Admin, _) => true,
            (Capability::Distributor(own), Some(target)) => own == target,
            _ => false,
        }
    }

    /// Checks [`Self::can_issue_for`] and returns the standard Forbidden
    /// error on denial.
    pub fn require_issue_for(
        &self,
        distributor: Option<&DistributorId>,
    ) -> Result<(), DomainError> {
        if self.can_issue_for(distributor) {
            return Ok(());
        }
        let mut err = DomainError::new(
            ErrorCode::Forbidden,
            "Capability does not permit code generation for this recipient",
        )
        .with_detail("capability", self.to_string());
        if let Some(id) = distributor {
            err = err.with_detail("distributor_id", id.to_string());
        }
        Err(err)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::None => write!(f, "anonymous"),
            Capability::Customer => write!(f, "customer"),
            Capability::Distributor(id) => write!(f, "distributor:{}", id),
            Capability::Admin => write!(f, "admin"),
        }
    }
}
