//! Shared response envelope for the public API.
//!
//! Every endpoint answers in the same shape: successes wrap their payload
//! in `{"success": true, "data": …}`, failures carry a structured error in
//! `{"success": false, "error": {"message", "code"}}`. Feature modules keep
//! their own error types; they all funnel through the helpers here so the
//! envelope and the status taxonomy stay in one place.
//!
//! Server-side failures are logged with full context and surfaced as a
//! generic internal error. The HTTP body never carries database messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};

/// Error payload inside the failure envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Human-readable explanation.
    pub message: String,

    /// Stable machine-readable code, e.g. `NOT_FOUND`.
    pub code: String,

    /// For `ALREADY_REDEEMED`: when the winning redemption happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<Timestamp>,
}

impl ApiErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
            redeemed_at: None,
        }
    }

    pub fn with_redeemed_at(mut self, redeemed_at: Timestamp) -> Self {
        self.redeemed_at = Some(redeemed_at);
        self
    }
}

/// Wraps a payload in the success envelope.
pub fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

/// Wraps an error body in the failure envelope with the given status.
pub fn failure(status: StatusCode, body: ApiErrorBody) -> Response {
    (status, Json(json!({ "success": false, "error": body }))).into_response()
}

/// Maps a domain error code to its public HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        // Malformed or unacceptable input
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat
        | ErrorCode::ProductNotActive
        | ErrorCode::PackageNotActive
        | ErrorCode::PackageProductMismatch => StatusCode::BAD_REQUEST,

        // Signature failures are fatal for the request, never retried
        ErrorCode::SignatureInvalid => StatusCode::BAD_REQUEST,

        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,

        ErrorCode::PaymentFailed | ErrorCode::PaymentNotSettled => StatusCode::PAYMENT_REQUIRED,

        ErrorCode::ProductNotFound
        | ErrorCode::PackageNotFound
        | ErrorCode::TransactionNotFound
        | ErrorCode::NotFound => StatusCode::NOT_FOUND,

        ErrorCode::AlreadyRedeemed | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,

        ErrorCode::Expired => StatusCode::GONE,

        ErrorCode::GatewayUnavailable => StatusCode::BAD_GATEWAY,

        ErrorCode::GeneratorExhausted
        | ErrorCode::IssuanceFailed
        | ErrorCode::DatabaseError
        | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Standard translation of a [`DomainError`] into the failure envelope.
///
/// Client-class errors pass their message through; server-class errors are
/// logged here and replaced with a generic body.
pub fn domain_failure(err: DomainError) -> Response {
    let status = status_for(err.code);
    if status.is_server_error() {
        error!(
            code = %err.code,
            message = %err.message,
            details = ?err.details,
            "request failed with internal error"
        );
        return failure(
            status,
            ApiErrorBody::new(ErrorCode::InternalError, "An internal error occurred"),
        );
    }
    failure(status, ApiErrorBody::new(err.code, err.message))
}
