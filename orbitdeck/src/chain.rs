//! Chain id primitives.
//!
//! Wallet providers exchange chain ids as `0x`-prefixed hex quantities
//! (`"0xa4b1"` for Arbitrum One); everything inside this crate uses plain
//! `u64` values. Conversion in both directions is exact: overflow, empty
//! digits, and non-hex characters are errors rather than silently truncated.

use crate::error::ErrorKind;

/// An EIP-155 chain id (e.g., 42161 for Arbitrum One).
pub type ChainId = u64;

/// Errors that can occur while parsing a chain id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainIdError {
    /// The input was empty or only a `0x` prefix.
    #[error("empty chain id")]
    Empty,
    /// The input contained a character outside the expected digit set.
    #[error("invalid chain id '{0}'")]
    Invalid(String),
    /// The value does not fit in 64 bits.
    #[error("chain id '{0}' overflows u64")]
    Overflow(String),
}

impl ChainIdError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Empty | Self::Invalid(_) | Self::Overflow(_) => ErrorKind::MalformedResponse,
        }
    }
}

/// Formats a chain id as a hex quantity.
///
/// Example: `to_hex(42161)` returns `"0xa4b1"`.
#[must_use]
pub fn to_hex(chain_id: ChainId) -> String {
    format!("{chain_id:#x}")
}

/// Parses a hex quantity (`0x`/`0X` prefix required) into a chain id.
///
/// # Errors
///
/// Returns [`ChainIdError`] if the input has no digits, contains non-hex
/// characters, or exceeds `u64::MAX`.
pub fn parse_hex(input: &str) -> Result<ChainId, ChainIdError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| ChainIdError::Invalid(trimmed.to_owned()))?;
    if digits.is_empty() {
        return Err(ChainIdError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChainIdError::Invalid(trimmed.to_owned()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| ChainIdError::Overflow(trimmed.to_owned()))
}

/// Parses a base-10 chain id, as typed into a form or stored by the registry.
///
/// Surrounding whitespace is ignored; anything else that is not an ASCII digit
/// is rejected, so `"12abc"` is an error rather than `12`.
///
/// # Errors
///
/// Returns [`ChainIdError`] if the input is empty, not purely decimal, or
/// exceeds `u64::MAX`.
pub fn parse_decimal(input: &str) -> Result<ChainId, ChainIdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChainIdError::Empty);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ChainIdError::Invalid(trimmed.to_owned()));
    }
    trimmed
        .parse()
        .map_err(|_| ChainIdError::Overflow(trimmed.to_owned()))
}

/// Parses either wire form: hex when prefixed with `0x`, decimal otherwise.
///
/// Some providers report `chainChanged` with a decimal string; this accepts
/// both without guessing on ambiguous input.
///
/// # Errors
///
/// Returns [`ChainIdError`] if neither form parses.
pub fn parse_any(input: &str) -> Result<ChainId, ChainIdError> {
    let trimmed = input.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        parse_hex(trimmed)
    } else {
        parse_decimal(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(1), "0x1");
        assert_eq!(to_hex(42161), "0xa4b1");
        assert_eq!(to_hex(421_614), "0x66eee");
        assert_eq!(to_hex(u64::MAX), "0xffffffffffffffff");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0xa4b1"), Ok(42161));
        assert_eq!(parse_hex("0XA4B1"), Ok(42161));
        assert_eq!(parse_hex(" 0x1 "), Ok(1));
        assert_eq!(parse_hex("0xffffffffffffffff"), Ok(u64::MAX));
    }

    #[test]
    fn test_parse_hex_rejects_junk() {
        assert_eq!(parse_hex("0x"), Err(ChainIdError::Empty));
        assert!(matches!(parse_hex("a4b1"), Err(ChainIdError::Invalid(_))));
        assert!(matches!(parse_hex("0xzz"), Err(ChainIdError::Invalid(_))));
        assert!(matches!(parse_hex("0x+1"), Err(ChainIdError::Invalid(_))));
        assert!(matches!(
            parse_hex("0x10000000000000000"),
            Err(ChainIdError::Overflow(_))
        ));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("39713"), Ok(39713));
        assert_eq!(parse_decimal(" 10 "), Ok(10));
        assert_eq!(parse_decimal(""), Err(ChainIdError::Empty));
        assert!(matches!(parse_decimal("abc"), Err(ChainIdError::Invalid(_))));
        assert!(matches!(parse_decimal("12abc"), Err(ChainIdError::Invalid(_))));
        assert!(matches!(parse_decimal("-5"), Err(ChainIdError::Invalid(_))));
    }

    #[test]
    fn test_parse_any() {
        assert_eq!(parse_any("0x2a"), Ok(42));
        assert_eq!(parse_any("42"), Ok(42));
        assert!(parse_any("x2a").is_err());
    }

    #[test]
    fn test_hex_conversion_is_exact() {
        for id in [0, 1, 10, 137, 42161, 11_155_111, u64::MAX - 1] {
            assert_eq!(parse_hex(&to_hex(id)), Ok(id));
        }
    }
}
