//! Code administration handlers.
//!
//! ## Commands
//! - Generating code batches for admins and distributors

mod generate_batch;

pub use generate_batch::{
    GenerateBatchCommand, GenerateBatchHandler, GenerateBatchResult, MAX_BATCH_SIZE,
    MAX_EXPIRY_DAYS,
};
