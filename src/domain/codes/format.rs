//! Redemption code textual format.
//!
//! Wire format: exactly `^[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}$`, twelve
//! symbols in three hyphen-separated groups of four.
//!
//! # Alphabet policy
//!
//! Newly minted codes draw from a fixed 32-symbol alphabet: uppercase
//! letters and digits minus the visually ambiguous `0`, `O`, `1`, `I`.
//! Twelve symbols over 32 values gives 60 bits of entropy. The *parser*
//! accepts the full `[A-Z0-9]` grammar so the wire contract is stable even
//! if the minting alphabet changes; a submitted code containing an
//! ambiguous symbol simply never matches a stored one.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Symbols used when minting new codes. Excludes `0`, `O`, `1`, `I`.
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Symbols per group.
pub const GROUP_LEN: usize = 4;

/// Number of groups.
pub const GROUP_COUNT: usize = 3;

/// Total textual length including the two hyphens.
pub const CODE_LEN: usize = GROUP_LEN * GROUP_COUNT + (GROUP_COUNT - 1);

/// A syntactically valid redemption code.
///
/// Matching the grammar says nothing about existence; lookups against the
/// code store decide that. Input is matched strictly, with no case folding
/// or trimming, mirroring the public API contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionCode(String);

impl RedemptionCode {
    /// Parses a candidate string against the fixed format.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - Input is empty
    /// - Length is not exactly 14
    /// - Hyphens are missing or misplaced
    /// - Any symbol is outside `[A-Z0-9]`
    pub fn parse(candidate: &str) -> Result<Self, ValidationError> {
        if candidate.is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        if candidate.len() != CODE_LEN {
            return Err(ValidationError::invalid_format(
                "code",
                format!("expected {} characters, got {}", CODE_LEN, candidate.len()),
            ));
        }
        for (i, c) in candidate.chars().enumerate() {
            let is_separator_slot = i == GROUP_LEN || i == 2 * GROUP_LEN + 1;
            if is_separator_slot {
                if c != '-' {
                    return Err(ValidationError::invalid_format(
                        "code",
                        "expected hyphen-separated groups AAAA-AAAA-AAAA",
                    ));
                }
            } else if !c.is_ascii_uppercase() && !c.is_ascii_digit() {
                return Err(ValidationError::invalid_format(
                    "code",
                    "symbols must be uppercase letters or digits",
                ));
            }
        }
        Ok(Self(candidate.to_string()))
    }

    /// Builds a code from twelve raw minting symbols.
    ///
    /// Used by the generator; symbols must come from [`CODE_ALPHABET`].
    pub(crate) fn from_symbols(symbols: &[u8]) -> Self {
        debug_assert_eq!(symbols.len(), GROUP_LEN * GROUP_COUNT);
        let mut text = String::with_capacity(CODE_LEN);
        for (i, &symbol) in symbols.iter().enumerate() {
            if i > 0 && i % GROUP_LEN == 0 {
                text.push('-');
            }
            text.push(symbol as char);
        }
        Self(text)
    }

    /// Returns the code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for RedemptionCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for RedemptionCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ════════════════════════════════════════════════════════════════════════════
    // Valid Code Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn well_formed_code_parses() {
        let code = RedemptionCode::parse("ABCD-1234-EFGH").unwrap();
        assert_eq!(code.as_str(), "ABCD-1234-EFGH");
    }

    #[test]
    fn ambiguous_symbols_are_still_grammatical() {
        // The parser accepts the full wire grammar, including symbols the
        // minting alphabet avoids.
        assert!(RedemptionCode::parse("O0O0-I1I1-AAAA").is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Invalid Code Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn empty_code_returns_error() {
        let result = RedemptionCode::parse("");
        match result.unwrap_err() {
            ValidationError::EmptyField { field } => assert_eq!(field, "code"),
            _ => panic!("Expected EmptyField error"),
        }
    }

    #[test]
    fn missing_hyphens_returns_error() {
        assert!(RedemptionCode::parse("abcd1234efgh").is_err());
        assert!(RedemptionCode::parse("ABCD1234EFGH").is_err());
    }

    #[test]
    fn lowercase_is_rejected_not_folded() {
        assert!(RedemptionCode::parse("abcd-1234-efgh").is_err());
    }

    #[test]
    fn wrong_length_returns_error() {
        assert!(RedemptionCode::parse("ABC-1234-EFGH").is_err());
        assert!(RedemptionCode::parse("ABCDE-1234-EFGH").is_err());
        assert!(RedemptionCode::parse("ABCD-1234-EFGH-").is_err());
    }

    #[test]
    fn misplaced_hyphens_return_error() {
        assert!(RedemptionCode::parse("ABCD1-234-EFGH").is_err());
        assert!(RedemptionCode::parse("-ABCD-1234-EFG").is_err());
    }

    #[test]
    fn special_characters_return_error() {
        assert!(RedemptionCode::parse("ABCD-12!4-EFGH").is_err());
        assert!(RedemptionCode::parse("ABCD 1234 EFGH").is_err());
    }

    #[test]
    fn surrounding_whitespace_is_rejected() {
        assert!(RedemptionCode::parse(" ABCD-1234-EFGH").is_err());
        assert!(RedemptionCode::parse("ABCD-1234-EFGH ").is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Construction and Conversion Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn from_symbols_inserts_separators() {
        let code = RedemptionCode::from_symbols(b"ABCDEFGHJKLM");
        assert_eq!(code.as_str(), "ABCD-EFGH-JKLM");
        assert!(RedemptionCode::parse(code.as_str()).is_ok());
    }

    #[test]
    fn try_from_str_works() {
        let code: RedemptionCode = "ABCD-1234-EFGH".try_into().unwrap();
        assert_eq!(code.to_string(), "ABCD-1234-EFGH");
    }

    #[test]
    fn alphabet_has_no_ambiguous_symbols() {
        for banned in [b'0', b'O', b'1', b'I'] {
            assert!(!CODE_ALPHABET.contains(&banned));
        }
        assert_eq!(CODE_ALPHABET.len(), 32);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Property Tests
    // ════════════════════════════════════════════════════════════════════════════

    proptest! {
        #[test]
        fn parser_accepts_exactly_the_wire_grammar(
            code in "[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}"
        ) {
            prop_assert!(RedemptionCode::parse(&code).is_ok());
        }

        #[test]
        fn parser_rejects_arbitrary_strings(s in "\\PC{0,20}") {
            let grammatical = s.len() == CODE_LEN
                && s.chars().enumerate().all(|(i, c)| {
                    if i == 4 || i == 9 {
                        c == '-'
                    } else {
                        c.is_ascii_uppercase() || c.is_ascii_digit()
                    }
                });
            if !grammatical {
                prop_assert!(RedemptionCode::parse(&s).is_err());
            }
        }

        #[test]
        fn minted_symbol_sets_always_parse(
            symbols in proptest::collection::vec(
                proptest::sample::select(CODE_ALPHABET.to_vec()),
                12,
            )
        ) {
            let code = RedemptionCode::from_symbols(&symbols);
            prop_assert!(RedemptionCode::parse(code.as_str()).is_ok());
        }
    }
}
