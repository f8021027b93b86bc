//! Capability extraction for axum handlers.
//!
//! Role resolution happens upstream of this service. The gateway in front
//! of the API forwards the resolved claims as plain headers:
//!
//! ```text
//! X-Api-Role: admin | distributor | customer
//! X-Distributor-Id: <uuid>        (required when role is distributor)
//! ```
//!
//! The [`CallerCapability`] extractor turns those headers into a
//! [`Capability`] value once per request; handlers never read headers
//! themselves and core operations receive the capability as plain data.
//! A request without a role header is an anonymous caller, which is fine
//! for the public endpoints and rejected by capability checks elsewhere.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::super::response::{failure, ApiErrorBody};
use crate::domain::foundation::{Capability, DistributorId, ErrorCode};

/// Header carrying the resolved role.
pub const ROLE_HEADER: &str = "X-Api-Role";

/// Header carrying the distributor id for distributor-role requests.
pub const DISTRIBUTOR_HEADER: &str = "X-Distributor-Id";

/// Extractor producing the request's resolved [`Capability`].
///
/// # Example
///
/// ```ignore
/// async fn my_handler(CallerCapability(capability): CallerCapability) -> impl IntoResponse {
///     format!("caller is {}", capability)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CallerCapability(pub Capability);

#[async_trait]
impl<S> FromRequestParts<S> for CallerCapability
where
    S: Send + Sync,
{
    type Rejection = CapabilityRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|h| h.to_str().ok());

        match role {
            None => Ok(CallerCapability(Capability::None)),
            Some("customer") => Ok(CallerCapability(Capability::Customer)),
            Some("admin") => Ok(CallerCapability(Capability::Admin)),
            Some("distributor") => {
                let raw = parts
                    .headers
                    .get(DISTRIBUTOR_HEADER)
                    .and_then(|h| h.to_str().ok())
                    .ok_or(CapabilityRejection::MissingDistributorId)?;
                let id = raw
                    .parse::<DistributorId>()
                    .map_err(|_| CapabilityRejection::MalformedDistributorId)?;
                Ok(CallerCapability(Capability::Distributor(id)))
            }
            Some(other) => Err(CapabilityRejection::UnknownRole(other.to_string())),
        }
    }
}

/// Rejection for requests whose capability headers are inconsistent.
///
/// These are claims from the upstream gateway, so an unparseable value is
/// a misconfiguration rather than a user mistake. Rejected with 403.
#[derive(Debug, Clone)]
pub enum CapabilityRejection {
    /// `X-Api-Role: distributor` without `X-Distributor-Id`.
    MissingDistributorId,

    /// `X-Distributor-Id` is not a UUID.
    MalformedDistributorId,

    /// `X-Api-Role` carries a value this service does not know.
    UnknownRole(String),
}

impl IntoResponse for CapabilityRejection {
    fn into_response(self) -> Response {
        let message = match self {
            CapabilityRejection::MissingDistributorId => {
                "Distributor role requires a distributor id".to_string()
            }
            CapabilityRejection::MalformedDistributorId => {
                "Distributor id is not a valid UUID".to_string()
            }
            CapabilityRejection::UnknownRole(role) => {
                format!("Unrecognized role '{}'", role)
            }
        };
        failure(
            StatusCode::FORBIDDEN,
            ApiErrorBody::new(ErrorCode::Forbidden, message),
        )
    }
}
