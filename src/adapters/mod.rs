//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - REST API endpoints
//! - `memory` - In-memory store implementations for tests and local runs
//! - `notifications` - Outbound customer notifications
//! - `postgres` - PostgreSQL-backed stores
//! - `stripe` - Payment gateway client and its webhook verification

pub mod http;
pub mod memory;
pub mod notifications;
pub mod postgres;
pub mod stripe;
