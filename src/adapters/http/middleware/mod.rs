//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `capability` - Capability extraction from gateway-resolved headers

pub mod capability;

pub use capability::{CallerCapability, CapabilityRejection, DISTRIBUTOR_HEADER, ROLE_HEADER};
