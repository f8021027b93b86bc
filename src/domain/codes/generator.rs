//! Credit code generation.
//!
//! Generation and uniqueness are fused into one step: mint random text,
//! try to insert it, and let the store's unique constraint arbitrate. A
//! collision is not an error, just a signal to draw again. The attempt
//! count is bounded; with 32 symbols in 12 positions the space holds
//! ~1.2e18 codes, so hitting the bound means something is wrong with the
//! store, not bad luck.

use std::sync::Arc;

use rand::Rng;
use tracing::warn;

use crate::ports::{CreditCodeStore, InsertOutcome};

use super::{CreditCode, IssuanceError, IssueSpec, RedemptionCode, CODE_ALPHABET, GROUP_COUNT, GROUP_LEN};

/// How many random draws to try before giving up on a single code.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Draws random code text from the unambiguous alphabet.
fn random_code() -> RedemptionCode {
    let mut rng = rand::thread_rng();
    let symbols: Vec<u8> = (0..GROUP_LEN * GROUP_COUNT)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())])
        .collect();
    RedemptionCode::from_symbols(&symbols)
}

/// Mints credit codes with store-enforced uniqueness.
pub struct CodeGenerator {
    store: Arc<dyn CreditCodeStore>,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn CreditCodeStore>) -> Self {
        Self { store }
    }

    /// Mint and persist one code for the given spec.
    ///
    /// Each attempt draws fresh text and inserts it; `DuplicateCode` from
    /// the store triggers another draw. Concurrent generators need no
    /// coordination beyond the unique constraint they already share.
    ///
    /// # Errors
    ///
    /// - `InvalidSpec` if the spec fails entity validation
    /// - `GeneratorExhausted` after [`MAX_GENERATION_ATTEMPTS`] collisions
    /// - `Infrastructure` if the store fails
    pub async fn mint(&self, spec: &IssueSpec) -> Result<CreditCode, IssuanceError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = CreditCode::issue(random_code(), spec.clone())?;
            match self.store.insert_if_absent(&candidate).await? {
                InsertOutcome::Inserted => return Ok(candidate),
                InsertOutcome::DuplicateCode => {
                    warn!(
                        code = %candidate.code,
                        attempt,
                        "generated code collided, drawing again"
                    );
                }
            }
        }
        Err(IssuanceError::generator_exhausted(MAX_GENERATION_ATTEMPTS))
    }
}
