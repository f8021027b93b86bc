//! Credit code error types.
//!
//! Errors related to code redemption, validation, and batch issuance.
//! Redemption outcomes are modeled as values rather than panics so the
//! losing side of a redemption race gets a structured answer, not a 500.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidFormat | 400 |
//! | NotFound | 404 |
//! | AlreadyRedeemed | 409 |
//! | Expired | 410 |
//! | Infrastructure | 500 |
//! | GeneratorExhausted | 500 |
//! | NoneIssued | 500 |
//! | InvalidSpec | 400 |

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, ValidationError};

/// Why a redemption or validation attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionError {
    /// The submitted string does not match the code format.
    ///
    /// Raised before any store lookup.
    InvalidFormat { reason: String },

    /// No code with this text exists.
    NotFound(String),

    /// The code was already redeemed, possibly by a concurrent caller.
    ///
    /// Carries the winning redemption's timestamp when known.
    AlreadyRedeemed { redeemed_at: Option<Timestamp> },

    /// The code expired before this attempt.
    Expired { expired_at: Timestamp },

    /// The store failed; the redemption outcome is unknown.
    Infrastructure(String),
}

impl RedemptionError {
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        RedemptionError::InvalidFormat {
            reason: reason.into(),
        }
    }

    pub fn not_found(code: impl Into<String>) -> Self {
        RedemptionError::NotFound(code.into())
    }

    pub fn already_redeemed(redeemed_at: Option<Timestamp>) -> Self {
        RedemptionError::AlreadyRedeemed { redeemed_at }
    }

    pub fn expired(expired_at: Timestamp) -> Self {
        RedemptionError::Expired { expired_at }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        RedemptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RedemptionError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            RedemptionError::NotFound(_) => ErrorCode::NotFound,
            RedemptionError::AlreadyRedeemed { .. } => ErrorCode::AlreadyRedeemed,
            RedemptionError::Expired { .. } => ErrorCode::Expired,
            RedemptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            RedemptionError::InvalidFormat { reason } => {
                format!("Invalid credit code format: {}", reason)
            }
            RedemptionError::NotFound(code) => format!("Credit code not found: {}", code),
            RedemptionError::AlreadyRedeemed { .. } => {
                "Credit code has already been redeemed".to_string()
            }
            RedemptionError::Expired { .. } => "Credit code has expired".to_string(),
            RedemptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RedemptionError::Infrastructure(_))
    }

    /// Returns the prior redemption's timestamp, if this error carries one.
    pub fn redeemed_at(&self) -> Option<Timestamp> {
        match self {
            RedemptionError::AlreadyRedeemed { redeemed_at } => *redeemed_at,
            _ => None,
        }
    }
}

impl std::fmt::Display for RedemptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RedemptionError {}

impl From<ValidationError> for RedemptionError {
    fn from(err: ValidationError) -> Self {
        RedemptionError::InvalidFormat {
            reason: err.to_string(),
        }
    }
}

impl From<DomainError> for RedemptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidFormat | ErrorCode::EmptyField => RedemptionError::InvalidFormat {
                reason: err.message,
            },
            ErrorCode::NotFound => RedemptionError::NotFound(err.message),
            _ => RedemptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<RedemptionError> for DomainError {
    fn from(err: RedemptionError) -> Self {
        let mut domain = DomainError::new(err.code(), err.message());
        if let Some(redeemed_at) = err.redeemed_at() {
            domain = domain.with_detail("redeemed_at", redeemed_at.as_datetime().to_rfc3339());
        }
        domain
    }
}

/// Why a batch issuance produced fewer codes than requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// The generator hit its attempt bound without finding a free code.
    GeneratorExhausted { attempts: u32 },

    /// Not a single code in the batch could be issued.
    NoneIssued { requested: u32 },

    /// The issue spec failed entity validation (e.g. zero credits).
    InvalidSpec(ValidationError),

    /// The store failed mid-batch.
    Infrastructure(String),
}

impl IssuanceError {
    pub fn generator_exhausted(attempts: u32) -> Self {
        IssuanceError::GeneratorExhausted { attempts }
    }

    pub fn none_issued(requested: u32) -> Self {
        IssuanceError::NoneIssued { requested }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        IssuanceError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            IssuanceError::GeneratorExhausted { .. } => ErrorCode::GeneratorExhausted,
            IssuanceError::NoneIssued { .. } => ErrorCode::IssuanceFailed,
            IssuanceError::InvalidSpec(_) => ErrorCode::ValidationFailed,
            IssuanceError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            IssuanceError::GeneratorExhausted { attempts } => format!(
                "Could not generate a unique credit code after {} attempts",
                attempts
            ),
            IssuanceError::NoneIssued { requested } => {
                format!("Failed to issue any of the {} requested codes", requested)
            }
            IssuanceError::InvalidSpec(err) => err.to_string(),
            IssuanceError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IssuanceError::Infrastructure(_))
    }
}

impl std::fmt::Display for IssuanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for IssuanceError {}

impl From<ValidationError> for IssuanceError {
    fn from(err: ValidationError) -> Self {
        IssuanceError::InvalidSpec(err)
    }
}

impl From<DomainError> for IssuanceError {
    fn from(err: DomainError) -> Self {
        IssuanceError::Infrastructure(err.to_string())
    }
}

impl From<IssuanceError> for DomainError {
    fn from(err: IssuanceError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // Constructor Tests
    // ============================================================

    #[test]
    fn invalid_format_creates_correctly() {
        let err = RedemptionError::invalid_format("must be XXXX-XXXX-XXXX");
        assert!(matches!(
            err,
            RedemptionError::InvalidFormat { ref reason } if reason == "must be XXXX-XXXX-XXXX"
        ));
        assert_eq!(err.code(), ErrorCode::InvalidFormat);
    }

    #[test]
    fn not_found_creates_correctly() {
        let err = RedemptionError::not_found("ABCD-2345-EFGH");
        assert!(matches!(err, RedemptionError::NotFound(ref c) if c == "ABCD-2345-EFGH"));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn already_redeemed_carries_winning_timestamp() {
        let won_at = Timestamp::now();
        let err = RedemptionError::already_redeemed(Some(won_at));
        assert_eq!(err.code(), ErrorCode::AlreadyRedeemed);
        assert_eq!(err.redeemed_at(), Some(won_at));
    }

    #[test]
    fn expired_creates_correctly() {
        let expired_at = Timestamp::now().minus_days(1);
        let err = RedemptionError::expired(expired_at);
        assert!(matches!(err, RedemptionError::Expired { expired_at: e } if e == expired_at));
        assert_eq!(err.code(), ErrorCode::Expired);
    }

    // ============================================================
    // Wire Code Tests
    // ============================================================

    #[test]
    fn redemption_codes_match_wire_values() {
        assert_eq!(
            RedemptionError::invalid_format("x").code().to_string(),
            "INVALID_FORMAT"
        );
        assert_eq!(
            RedemptionError::not_found("x").code().to_string(),
            "NOT_FOUND"
        );
        assert_eq!(
            RedemptionError::already_redeemed(None).code().to_string(),
            "ALREADY_REDEEMED"
        );
        assert_eq!(
            RedemptionError::expired(Timestamp::now()).code().to_string(),
            "EXPIRED"
        );
    }

    // ============================================================
    // Conversion Tests
    // ============================================================

    #[test]
    fn validation_error_becomes_invalid_format() {
        let validation = ValidationError::invalid_format("code", "wrong length");
        let err: RedemptionError = validation.into();
        assert_eq!(err.code(), ErrorCode::InvalidFormat);
    }

    #[test]
    fn already_redeemed_converts_with_timestamp_detail() {
        let won_at: Timestamp = serde_json::from_str("\"2024-03-01T12:00:00Z\"").unwrap();
        let domain: DomainError = RedemptionError::already_redeemed(Some(won_at)).into();

        assert_eq!(domain.code, ErrorCode::AlreadyRedeemed);
        let detail = domain.details.get("redeemed_at").unwrap();
        assert!(detail.starts_with("2024-03-01T12:00:00"));
    }

    #[test]
    fn infrastructure_is_retryable() {
        assert!(RedemptionError::infrastructure("connection reset").is_retryable());
        assert!(!RedemptionError::not_found("X").is_retryable());
        assert!(IssuanceError::infrastructure("connection reset").is_retryable());
        assert!(!IssuanceError::generator_exhausted(10).is_retryable());
    }

    // ============================================================
    // Issuance Tests
    // ============================================================

    #[test]
    fn generator_exhausted_reports_attempts() {
        let err = IssuanceError::generator_exhausted(10);
        assert_eq!(err.code(), ErrorCode::GeneratorExhausted);
        assert!(err.message().contains("10 attempts"));
    }

    #[test]
    fn none_issued_reports_requested_count() {
        let err = IssuanceError::none_issued(25);
        assert_eq!(err.code(), ErrorCode::IssuanceFailed);
        assert!(err.message().contains("25"));
    }

    #[test]
    fn issuance_error_converts_to_domain_error() {
        let domain: DomainError = IssuanceError::generator_exhausted(10).into();
        assert_eq!(domain.code, ErrorCode::GeneratorExhausted);
    }
}
