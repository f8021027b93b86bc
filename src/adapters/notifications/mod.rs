//! Notification adapters - Outbound customer notification implementations.

mod log_sink;

pub use log_sink::LogNotificationSink;
