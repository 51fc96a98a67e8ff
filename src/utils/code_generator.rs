//! Base-62 short code encoding and custom alias validation.
//!
//! Generated codes are built from a millisecond timestamp rendered in base 62
//! followed by a short random suffix. The [`Alphabet`] is an immutable value
//! owned by whoever generates codes; nothing here holds global mutable state.

use crate::error::AppError;
use rand::Rng;
use std::sync::LazyLock;

/// The default 62-symbol alphabet: digits, lowercase, uppercase.
pub const BASE62_SYMBOLS: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

static BASE62: LazyLock<Alphabet> = LazyLock::new(Alphabet::base62);

/// Errors produced when building an alphabet or decoding a code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("Cannot decode an empty code")]
    Empty,

    #[error("Character '{ch}' at position {position} is not in the alphabet")]
    InvalidCharacter { ch: char, position: usize },

    #[error("Code value does not fit in 64 bits")]
    Overflow,

    #[error("Alphabet must contain at least two distinct ASCII symbols")]
    InvalidAlphabet,
}

/// Source of uniformly distributed indices used for random suffixes.
///
/// Injected into the allocator so tests can script the generated codes.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..bound`. `bound` is always greater than zero.
    fn next_index(&self, bound: usize) -> usize;
}

/// [`RandomSource`] backed by the thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// An ordered set of ASCII symbols used as positional digits.
///
/// The symbol at index 0 is the zero digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Box<[u8]>,
}

impl Alphabet {
    /// The `[0-9][a-z][A-Z]` alphabet.
    pub fn base62() -> Self {
        Self {
            symbols: BASE62_SYMBOLS.as_bytes().into(),
        }
    }

    /// Builds an alphabet from a string of distinct ASCII symbols.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::InvalidAlphabet`] for fewer than two symbols,
    /// non-ASCII input, or duplicates.
    pub fn new(symbols: &str) -> Result<Self, CodeError> {
        let bytes = symbols.as_bytes();
        if bytes.len() < 2 || !symbols.is_ascii() {
            return Err(CodeError::InvalidAlphabet);
        }

        let mut seen = [false; 128];
        for &b in bytes {
            if seen[b as usize] {
                return Err(CodeError::InvalidAlphabet);
            }
            seen[b as usize] = true;
        }

        Ok(Self {
            symbols: bytes.into(),
        })
    }

    /// Number of symbols, i.e. the radix.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; an alphabet has at least two symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.digit_of(ch).is_some()
    }

    fn digit_of(&self, ch: char) -> Option<u64> {
        if !ch.is_ascii() {
            return None;
        }
        self.symbols
            .iter()
            .position(|&b| b == ch as u8)
            .map(|d| d as u64)
    }

    /// Renders `n` most-significant digit first, without padding.
    ///
    /// `encode(0)` is the single zero symbol.
    pub fn encode(&self, mut n: u64) -> String {
        let base = self.symbols.len() as u64;
        if n == 0 {
            return char::from(self.symbols[0]).to_string();
        }

        let mut digits = Vec::with_capacity(12);
        while n > 0 {
            digits.push(self.symbols[(n % base) as usize]);
            n /= base;
        }

        digits.into_iter().rev().map(char::from).collect()
    }

    /// Parses a code produced by [`Alphabet::encode`].
    ///
    /// # Errors
    ///
    /// - [`CodeError::Empty`] for an empty string
    /// - [`CodeError::InvalidCharacter`] for a symbol outside the alphabet
    /// - [`CodeError::Overflow`] if the value exceeds `u64::MAX`
    pub fn decode(&self, code: &str) -> Result<u64, CodeError> {
        if code.is_empty() {
            return Err(CodeError::Empty);
        }

        let base = self.symbols.len() as u64;
        code.chars()
            .enumerate()
            .try_fold(0u64, |acc, (position, ch)| {
                let digit = self
                    .digit_of(ch)
                    .ok_or(CodeError::InvalidCharacter { ch, position })?;
                acc.checked_mul(base)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or(CodeError::Overflow)
            })
    }

    /// Returns `len` independently and uniformly chosen symbols.
    pub fn random_suffix<R: RandomSource + ?Sized>(&self, len: usize, random: &R) -> String {
        (0..len)
            .map(|_| char::from(self.symbols[random.next_index(self.symbols.len())]))
            .collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::base62()
    }
}

/// Encodes `n` with the default base-62 alphabet.
pub fn encode(n: u64) -> String {
    BASE62.encode(n)
}

/// Decodes a base-62 code with the default alphabet.
pub fn decode(code: &str) -> Result<u64, CodeError> {
    BASE62.decode(code)
}

/// Returns `len` random base-62 symbols from the thread-local generator.
pub fn random_suffix(len: usize) -> String {
    BASE62.random_suffix(len, &ThreadRandom)
}

/// Validates a caller-chosen alias.
///
/// Accepts one or more ASCII letters, digits, hyphens or underscores.
/// Uniqueness is the caller's concern.
///
/// # Errors
///
/// Returns [`AppError::InvalidAlias`] on an empty alias or a disallowed character.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_alias("my-link_1").is_ok());
/// assert!(validate_custom_alias("has space").is_err());
/// assert!(validate_custom_alias("").is_err());
/// ```
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() {
        return Err(AppError::invalid_alias(alias, "alias must not be empty"));
    }

    if let Some(bad) = alias
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(AppError::invalid_alias(
            alias,
            format!(
                "'{bad}' is not allowed; use letters, digits, hyphens, and underscores"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_has_62_unique_symbols() {
        let alphabet = Alphabet::base62();
        assert_eq!(alphabet.len(), 62);

        let unique: HashSet<_> = BASE62_SYMBOLS.chars().collect();
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn test_encode_zero_is_first_symbol() {
        assert_eq!(encode(0), "0");
    }

    #[test]
    fn test_encode_last_single_digit() {
        assert_eq!(encode(61), "Z");
    }

    #[test]
    fn test_encode_rollover() {
        assert_eq!(encode(62), "10");
        assert_eq!(encode(62 * 62), "100");
        assert_eq!(encode(62 * 62 - 1), "ZZ");
    }

    #[test]
    fn test_encode_has_no_leading_zero_symbol() {
        for n in [1u64, 61, 62, 3843, 1_700_000_000_000, u64::MAX] {
            assert!(!encode(n).starts_with('0'), "encode({n}) is padded");
        }
    }

    #[test]
    fn test_decode_inverts_encode() {
        let samples = [
            0u64,
            1,
            61,
            62,
            63,
            3843,
            3844,
            1_700_000_000_000,
            u64::MAX - 1,
            u64::MAX,
        ];
        for n in samples {
            assert_eq!(decode(&encode(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_decode_is_case_sensitive() {
        assert_eq!(decode("a").unwrap(), 10);
        assert_eq!(decode("A").unwrap(), 36);
    }

    #[test]
    fn test_decode_rejects_foreign_character() {
        assert_eq!(
            decode("ab-c").unwrap_err(),
            CodeError::InvalidCharacter {
                ch: '-',
                position: 2
            }
        );
        assert!(matches!(
            decode("é").unwrap_err(),
            CodeError::InvalidCharacter { position: 0, .. }
        ));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert_eq!(decode("").unwrap_err(), CodeError::Empty);
    }

    #[test]
    fn test_decode_overflow() {
        let too_big = format!("{}0", encode(u64::MAX));
        assert_eq!(decode(&too_big).unwrap_err(), CodeError::Overflow);
    }

    #[test]
    fn test_custom_alphabet() {
        let binary = Alphabet::new("01").unwrap();
        assert_eq!(binary.encode(5), "101");
        assert_eq!(binary.decode("101").unwrap(), 5);
    }

    #[test]
    fn test_invalid_alphabets() {
        assert_eq!(Alphabet::new("a").unwrap_err(), CodeError::InvalidAlphabet);
        assert_eq!(Alphabet::new("abca").unwrap_err(), CodeError::InvalidAlphabet);
        assert_eq!(Alphabet::new("aé").unwrap_err(), CodeError::InvalidAlphabet);
    }

    #[test]
    fn test_random_suffix_length_and_symbols() {
        let suffix = random_suffix(16);
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| Alphabet::base62().contains(c)));
    }

    #[test]
    fn test_random_suffix_zero_length() {
        assert_eq!(random_suffix(0), "");
    }

    #[test]
    fn test_validate_accepts_mixed_alias() {
        assert!(validate_custom_alias("my-link_1").is_ok());
        assert!(validate_custom_alias("Promo2025").is_ok());
        assert!(validate_custom_alias("x").is_ok());
    }

    #[test]
    fn test_validate_rejects_space() {
        let err = validate_custom_alias("has space").unwrap_err();
        assert!(matches!(err, AppError::InvalidAlias { .. }));
        assert!(err.to_string().contains("has space"));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(
            validate_custom_alias("").unwrap_err(),
            AppError::InvalidAlias { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_symbols() {
        for alias in ["my/link", "a.b", "promo!", "café", "a@b"] {
            assert!(
                validate_custom_alias(alias).is_err(),
                "alias '{alias}' should be invalid"
            );
        }
    }
}
