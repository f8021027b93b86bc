//! Creditflow - Credit code issuance and redemption platform
//!
//! Customers buy credit packages through a card payment flow, receive
//! single-use credit codes, and redeem them for product credits. Payment
//! settlement is reconciled through signed gateway webhooks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
